//! Login, logout and admin status.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, Empty};
use crate::auth::{clear_session_cookie, session_cookie, SessionId};
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginFailed {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatus {
    pub is_admin: bool,
}

/// POST /login - Open an admin session.
pub async fn login(
    State(state): State<AppState>,
    session: SessionId,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;

    match state
        .sessions
        .login(session.as_deref(), &request.password)
        .await
    {
        Some(id) => {
            let cookie = session_cookie(&id)?;
            Ok(([(SET_COOKIE, cookie)], success(Empty {})).into_response())
        }
        None => Ok(Json(LoginFailed {
            success: false,
            message: "Invalid password".to_string(),
        })
        .into_response()),
    }
}

/// GET /logout - Destroy the session.
pub async fn logout(State(state): State<AppState>, session: SessionId) -> Response {
    state.sessions.logout(session.as_deref()).await;
    ([(SET_COOKIE, clear_session_cookie())], success(Empty {})).into_response()
}

/// GET /isAdmin - Report whether the session is authenticated.
pub async fn is_admin(State(state): State<AppState>, session: SessionId) -> Json<AdminStatus> {
    Json(AdminStatus {
        is_admin: state.sessions.is_admin(session.as_deref()).await,
    })
}
