//! Comment record model.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when a commenter leaves the name blank.
pub const ANONYMOUS: &str = "Anonymous";

/// A visitor comment attached to a gallery category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: String,
    pub category: String,
    pub name: String,
    pub comment: String,
    /// RFC 3339 UTC creation instant, millisecond precision
    pub timestamp: String,
}

impl CommentRecord {
    pub fn new(category: String, name: Option<String>, comment: String) -> Self {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            category,
            name,
            comment,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Request body for `POST /comments`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_defaults_to_anonymous() {
        let a = CommentRecord::new("Life".into(), None, "nice".into());
        let b = CommentRecord::new("Life".into(), Some("   ".into()), "nice".into());
        assert_eq!(a.name, ANONYMOUS);
        assert_eq!(b.name, ANONYMOUS);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_timestamp_is_utc_millis() {
        let c = CommentRecord::new("Life".into(), Some("Ann".into()), "hi".into());
        assert!(c.timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&c.timestamp).is_ok());
        // YYYY-MM-DDTHH:MM:SS.mmmZ
        assert_eq!(c.timestamp.len(), 24);
    }
}
