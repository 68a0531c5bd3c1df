//! Root document persisted by the store.

use serde::{Deserialize, Serialize};

use super::{CommentRecord, ImageRecord};

/// Everything the gallery knows, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreDocument {
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
}

impl StoreDocument {
    pub fn images_in(&self, category: &str) -> Vec<ImageRecord> {
        self.images
            .iter()
            .filter(|img| img.category == category)
            .cloned()
            .collect()
    }

    pub fn comments_in(&self, category: &str) -> Vec<CommentRecord> {
        self.comments
            .iter()
            .filter(|c| c.category == category)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collections_default_to_empty() {
        let doc: StoreDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.images.is_empty());
        assert!(doc.comments.is_empty());

        let doc: StoreDocument = serde_json::from_str(r#"{"images":[]}"#).unwrap();
        assert!(doc.comments.is_empty());
    }

    #[test]
    fn test_category_filter_keeps_order() {
        let mut doc = StoreDocument::default();
        for (cat, name) in [("Life", "a"), ("Vacations", "b"), ("Life", "c")] {
            doc.images.push(ImageRecord::new(
                cat,
                name.to_string(),
                format!("/uploads/{}", name),
            ));
        }

        let names: Vec<_> = doc.images_in("Life").into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(doc.images_in("Nature").is_empty());
    }
}
