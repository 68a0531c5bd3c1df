//! HTTP API module.
//!
//! Handlers for the gallery routes. Every JSON response carries a top-level
//! `success` flag; the remaining keys depend on the route.

mod comments;
mod images;
mod session;

pub use comments::*;
pub use images::*;
pub use session::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse {
        success: true,
        data,
    })
}

/// Payload for responses that carry nothing beyond `success`.
#[derive(Debug, Serialize)]
pub struct Empty {}

/// `?category=` query shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub category: Option<String>,
}

impl CategoryQuery {
    fn required(self) -> Result<String, AppError> {
        self.category.filter(|c| !c.is_empty()).ok_or_else(|| {
            AppError::InvalidInput("Category query parameter is required".to_string())
        })
    }
}
