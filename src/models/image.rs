//! Image record model.

use serde::{Deserialize, Deserializer, Serialize};

/// Metadata for one uploaded image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageRecord {
    pub id: String,
    pub category: String,
    /// Original filename as sent by the browser, display-only
    pub name: String,
    /// Retrieval path of the stored file, e.g. `/uploads/<stored-name>`
    pub path: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub caption: String,
}

impl ImageRecord {
    pub fn new(category: &str, name: String, path: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            category: category.to_string(),
            name,
            path,
            caption: String::new(),
        }
    }
}

/// Request body for `PUT /images/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCaptionRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub caption: String,
}

/// Older documents may carry `"caption": null` where a caption was cleared.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
