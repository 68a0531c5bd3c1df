//! Image endpoints.

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    Json,
};
use serde::Serialize;

use super::{success, ApiResult, CategoryQuery, Empty};
use crate::auth::Admin;
use crate::errors::AppError;
use crate::models::{ImageRecord, UpdateCaptionRequest};
use crate::uploads::{StoredFile, UploadStore};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct FilesBody {
    pub files: Vec<ImageRecord>,
}

#[derive(Debug, Serialize)]
pub struct ImagesBody {
    pub images: Vec<ImageRecord>,
}

#[derive(Debug, Serialize)]
pub struct ImageBody {
    pub image: ImageRecord,
}

/// POST /upload - Store one or more images under a category.
pub async fn upload_images(
    State(state): State<AppState>,
    admin: Admin,
    mut multipart: Multipart,
) -> ApiResult<FilesBody> {
    let mut written = Vec::new();
    let outcome = match receive_upload(&mut multipart, &state.uploads, &mut written).await {
        Ok(category) => {
            state
                .repo
                .create_images(&admin, category.as_deref().unwrap_or_default(), &written)
                .await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(files) => success(FilesBody { files }),
        Err(e) => {
            state.uploads.discard(&written).await;
            Err(e)
        }
    }
}

/// Read the multipart body, writing every `images` part to disk.
///
/// Files written before a failure are pushed onto `written` so the caller can
/// discard them.
async fn receive_upload(
    multipart: &mut Multipart,
    uploads: &UploadStore,
    written: &mut Vec<StoredFile>,
) -> Result<Option<String>, AppError> {
    let mut category = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("category") => category = Some(field.text().await?),
            Some("images") => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty nameless part when no file was picked.
                if original_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                written.push(uploads.write(&original_name, &bytes).await?);
            }
            _ => {}
        }
    }

    Ok(category)
}

/// GET /images?category= - List images in a category.
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<ImagesBody> {
    let category = query.required()?;
    let images = state.repo.list_images(&category).await?;
    success(ImagesBody { images })
}

/// PUT /images/{id} - Update an image caption.
pub async fn update_image(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCaptionRequest>, JsonRejection>,
) -> ApiResult<ImageBody> {
    let Json(request) = payload?;
    let image = state
        .repo
        .update_caption(&admin, &id, request.caption)
        .await?;
    success(ImageBody { image })
}

/// DELETE /images/{id} - Delete an image and its file.
pub async fn delete_image(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<String>,
) -> ApiResult<Empty> {
    state.repo.delete_image(&admin, &id).await?;
    success(Empty {})
}
