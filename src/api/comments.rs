//! Comment endpoints.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::Serialize;

use super::{success, ApiResult, CategoryQuery};
use crate::models::{CommentRecord, CreateCommentRequest};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CommentBody {
    pub comment: CommentRecord,
}

#[derive(Debug, Serialize)]
pub struct CommentsBody {
    pub comments: Vec<CommentRecord>,
}

/// POST /comments - Add a comment to a category.
pub async fn add_comment(
    State(state): State<AppState>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> ApiResult<CommentBody> {
    let Json(request) = payload?;
    let comment = state.repo.add_comment(request).await?;
    success(CommentBody { comment })
}

/// GET /comments?category= - List comments in a category.
pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<CommentsBody> {
    let category = query.required()?;
    let comments = state.repo.list_comments(&category).await?;
    success(CommentsBody { comments })
}
