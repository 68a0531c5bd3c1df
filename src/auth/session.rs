//! Server-side session state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use super::Admin;
use crate::errors::AppError;

/// Admin state of one browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Authenticated sessions keyed by session id.
///
/// Visitors who never logged in have no entry; any unknown id is anonymous.
#[derive(Debug)]
pub struct SessionStore {
    password: String,
    ttl: Duration,
    sessions: RwLock<HashMap<String, Instant>>,
}

impl SessionStore {
    pub fn new(password: impl Into<String>, ttl: Duration) -> Self {
        Self {
            password: password.into(),
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Check `password` and, on a match, open a new authenticated session.
    ///
    /// Returns the new session id. Any previous session `current` is dropped so
    /// a pre-login id is never promoted.
    pub async fn login(&self, current: Option<&str>, password: &str) -> Option<String> {
        if password.is_empty() || !constant_time_compare(password, &self.password) {
            tracing::info!("Rejected admin login attempt");
            return None;
        }

        let id = uuid::Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        if let Some(old) = current {
            sessions.remove(old);
        }
        let ttl = self.ttl;
        sessions.retain(|_, last_seen| now.duration_since(*last_seen) <= ttl);
        sessions.insert(id.clone(), now);

        tracing::info!("Admin session opened");
        Some(id)
    }

    /// Destroy the session, if any.
    pub async fn logout(&self, current: Option<&str>) {
        if let Some(id) = current {
            if self.sessions.write().await.remove(id).is_some() {
                tracing::info!("Admin session closed");
            }
        }
    }

    /// Current state of the session, refreshing its idle timer.
    pub async fn state(&self, current: Option<&str>) -> SessionState {
        let Some(id) = current else {
            return SessionState::Anonymous;
        };

        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(last_seen) if now.duration_since(*last_seen) <= self.ttl => {
                *last_seen = now;
                SessionState::Authenticated
            }
            Some(_) => {
                sessions.remove(id);
                tracing::debug!("Admin session expired");
                SessionState::Anonymous
            }
            None => SessionState::Anonymous,
        }
    }

    pub async fn is_admin(&self, current: Option<&str>) -> bool {
        self.state(current).await == SessionState::Authenticated
    }

    /// Gate for every mutating operation.
    pub async fn require_admin(&self, current: Option<&str>) -> Result<Admin, AppError> {
        match self.state(current).await {
            SessionState::Authenticated => Ok(Admin { _private: () }),
            SessionState::Anonymous => Err(AppError::Unauthorized("Forbidden".to_string())),
        }
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new("correct-password", Duration::from_secs(60))
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
        assert!(!constant_time_compare("short", "much-longer-key"));
        assert!(!constant_time_compare("", "not-empty"));
    }

    #[tokio::test]
    async fn test_login_logout_cycle() {
        let sessions = store();

        let id = sessions.login(None, "correct-password").await.unwrap();
        assert!(sessions.is_admin(Some(&id)).await);
        assert!(sessions.require_admin(Some(&id)).await.is_ok());

        sessions.logout(Some(&id)).await;
        assert!(!sessions.is_admin(Some(&id)).await);
        assert_eq!(
            sessions.require_admin(Some(&id)).await.unwrap_err(),
            AppError::Unauthorized("Forbidden".to_string())
        );
    }

    #[tokio::test]
    async fn test_wrong_password_stays_anonymous() {
        let sessions = store();

        assert!(sessions.login(None, "wrong").await.is_none());
        assert!(!sessions.is_admin(None).await);
        assert!(!sessions.is_admin(Some("made-up-id")).await);
    }

    #[tokio::test]
    async fn test_empty_password_never_logs_in() {
        let sessions = SessionStore::new("", Duration::from_secs(60));
        assert!(sessions.login(None, "").await.is_none());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let sessions = store();
        let id = sessions.login(None, "correct-password").await.unwrap();

        assert!(sessions.login(Some(&id), "wrong").await.is_none());
        assert!(sessions.is_admin(Some(&id)).await);
    }

    #[tokio::test]
    async fn test_relogin_rotates_session_id() {
        let sessions = store();
        let first = sessions.login(None, "correct-password").await.unwrap();
        let second = sessions
            .login(Some(&first), "correct-password")
            .await
            .unwrap();

        assert_ne!(first, second);
        assert!(!sessions.is_admin(Some(&first)).await);
        assert!(sessions.is_admin(Some(&second)).await);
    }

    #[tokio::test]
    async fn test_idle_session_expires() {
        let sessions = SessionStore::new("pw", Duration::ZERO);
        let id = sessions.login(None, "pw").await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(sessions.state(Some(&id)).await, SessionState::Anonymous);
    }
}
