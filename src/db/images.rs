//! Image record manager.

use super::Repository;
use crate::auth::Admin;
use crate::errors::AppError;
use crate::models::ImageRecord;
use crate::uploads::StoredFile;

impl Repository {
    /// Record a batch of already-stored files under one category.
    ///
    /// The whole batch is persisted with a single save: either every record is
    /// committed or none is.
    pub async fn create_images(
        &self,
        _admin: &Admin,
        category: &str,
        files: &[StoredFile],
    ) -> Result<Vec<ImageRecord>, AppError> {
        if category.trim().is_empty() {
            return Err(AppError::InvalidInput("Category is required".to_string()));
        }
        if files.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one image is required".to_string(),
            ));
        }

        let records: Vec<ImageRecord> = files
            .iter()
            .map(|f| ImageRecord::new(category, f.original_name.clone(), f.public_path()))
            .collect();

        self.store
            .mutate(|doc| {
                doc.images.extend(records.iter().cloned());
                Ok(())
            })
            .await?;

        tracing::info!("Added {} image(s) to {:?}", records.len(), category);
        Ok(records)
    }

    /// Images in `category`, in upload order.
    pub async fn list_images(&self, category: &str) -> Result<Vec<ImageRecord>, AppError> {
        Ok(self.store.load().await?.images_in(category))
    }

    /// Replace the caption of one image.
    pub async fn update_caption(
        &self,
        _admin: &Admin,
        id: &str,
        caption: String,
    ) -> Result<ImageRecord, AppError> {
        self.store
            .mutate(|doc| {
                let image = doc
                    .images
                    .iter_mut()
                    .find(|img| img.id == id)
                    .ok_or_else(|| image_not_found(id))?;
                image.caption = caption;
                Ok(image.clone())
            })
            .await
    }

    /// Remove an image record, then its backing file.
    ///
    /// The record is gone once this returns `Ok`, whether or not the file could
    /// be removed.
    pub async fn delete_image(&self, _admin: &Admin, id: &str) -> Result<ImageRecord, AppError> {
        let removed = self
            .store
            .mutate(|doc| {
                let index = doc
                    .images
                    .iter()
                    .position(|img| img.id == id)
                    .ok_or_else(|| image_not_found(id))?;
                Ok(doc.images.remove(index))
            })
            .await?;

        match self.uploads.remove_by_path(&removed.path).await {
            Ok(()) => tracing::info!("Deleted image {} and file {}", removed.id, removed.path),
            Err(e) => tracing::warn!(
                "Deleted image {} but could not remove file {}: {}",
                removed.id,
                removed.path,
                e
            ),
        }

        Ok(removed)
    }
}

fn image_not_found(id: &str) -> AppError {
    tracing::debug!("Image {} not found", id);
    AppError::NotFound("Image not found".to_string())
}
