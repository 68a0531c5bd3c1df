//! Comment record manager.

use super::Repository;
use crate::errors::AppError;
use crate::models::{CommentRecord, CreateCommentRequest};

impl Repository {
    /// Append a visitor comment. Open to everyone.
    pub async fn add_comment(
        &self,
        request: CreateCommentRequest,
    ) -> Result<CommentRecord, AppError> {
        let category = required(request.category);
        let comment = required(request.comment);
        let (Some(category), Some(comment)) = (category, comment) else {
            return Err(AppError::InvalidInput(
                "Category and comment required".to_string(),
            ));
        };

        let record = CommentRecord::new(category, request.name, comment);
        self.store
            .mutate(|doc| {
                doc.comments.push(record.clone());
                Ok(())
            })
            .await?;

        tracing::info!("Added comment {} to {:?}", record.id, record.category);
        Ok(record)
    }

    /// Comments in `category`, oldest first.
    pub async fn list_comments(&self, category: &str) -> Result<Vec<CommentRecord>, AppError> {
        Ok(self.store.load().await?.comments_in(category))
    }
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
