//! Cookie-based admin sessions.
//!
//! The session id travels in the `gallery_sid` cookie; the admin flag itself
//! lives only in the server-side [`SessionStore`].

mod session;

pub use session::*;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
};

use crate::errors::AppError;
use crate::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "gallery_sid";

/// Proof that the current request passed the admin gate.
///
/// Only [`SessionStore::require_admin`] can construct one, so every function
/// taking `&Admin` is reachable only through the gate.
#[derive(Debug)]
pub struct Admin {
    _private: (),
}

impl FromRequestParts<AppState> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session_id = session_id_from_headers(&parts.headers);
        let result = state.sessions.require_admin(session_id.as_deref()).await;
        if result.is_err() {
            tracing::warn!("Denied {} {}: no admin session", parts.method, parts.uri.path());
        }
        result
    }
}

/// Session id sent by the client, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionId(pub Option<String>);

impl SessionId {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionId(session_id_from_headers(&parts.headers)))
    }
}

/// Find the session cookie among all `Cookie` headers.
fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value handing the client a session id.
pub fn session_cookie(id: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, id
    ))
    .map_err(|e| AppError::Internal(format!("Invalid session cookie: {}", e)))
}

/// `Set-Cookie` value telling the client to drop its session id.
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("gallery_sid=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
