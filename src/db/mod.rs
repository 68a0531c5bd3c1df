//! Flat-file JSON persistence.
//!
//! One JSON document on disk is the source of truth for all gallery records.
//! Every mutation reads the whole document, changes it in memory and writes the
//! whole document back through an atomic temp-file-then-rename replace.

mod comments;
mod images;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::models::StoreDocument;
use crate::uploads::UploadStore;

/// Owner of the on-disk document.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    // Held from load to save by every writer.
    write_lock: Mutex<()>,
}

impl Store {
    /// Open the store at `path`, creating its parent directory if needed.
    ///
    /// The document itself is created lazily on the first save.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted document.
    ///
    /// A missing document reads as empty. So does an unparseable one: its
    /// contents are dropped and will be overwritten by the next save.
    pub async fn load(&self) -> Result<StoreDocument, AppError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreDocument::default()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                tracing::warn!(
                    "Discarding unparseable store document {:?}: {}",
                    self.path,
                    e
                );
                Ok(StoreDocument::default())
            }
        }
    }

    /// Replace the persisted document with `doc`.
    pub async fn save(&self, doc: &StoreDocument) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.write_document(doc).await
    }

    /// Run one read-modify-write cycle under the write lock.
    ///
    /// The document is saved only when `apply` returns `Ok`; on `Err` the file
    /// on disk is left exactly as it was.
    pub async fn mutate<T, F>(&self, apply: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut StoreDocument) -> Result<T, AppError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let out = apply(&mut doc)?;
        self.write_document(&doc).await?;
        Ok(out)
    }

    async fn write_document(&self, doc: &StoreDocument) -> Result<(), AppError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp_path = self.temp_path();

        if let Err(e) = write_synced(&tmp_path, &bytes).await {
            discard_temp(&tmp_path).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            discard_temp(&tmp_path).await;
            return Err(e.into());
        }

        tracing::debug!("Saved store document ({} bytes)", bytes.len());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "db.json".to_string());
        let tmp_name = format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4().simple());
        self.path.with_file_name(tmp_name)
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

async fn discard_temp(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!("Failed to remove temp file {:?}: {}", path, e);
        }
    }
}

/// Record managers for images and comments, backed by the [`Store`].
#[derive(Debug)]
pub struct Repository {
    store: Store,
    uploads: Arc<UploadStore>,
}

impl Repository {
    pub fn new(store: Store, uploads: Arc<UploadStore>) -> Self {
        Self { store, uploads }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommentRecord, ImageRecord};
    use tempfile::TempDir;

    fn sample_document() -> StoreDocument {
        StoreDocument {
            images: vec![ImageRecord::new(
                "Life",
                "a.jpg".into(),
                "/uploads/a.jpg".into(),
            )],
            comments: vec![CommentRecord::new(
                "Life".into(),
                Some("Ann".into()),
                "lovely".into(),
            )],
        }
    }

    #[tokio::test]
    async fn test_load_missing_document_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("data").join("db.json"))
            .await
            .unwrap();

        let doc = store.load().await.unwrap();
        assert_eq!(doc, StoreDocument::default());
        assert!(dir.path().join("data").is_dir());
    }

    #[tokio::test]
    async fn test_malformed_document_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = Store::open(&path).await.unwrap();

        assert_eq!(store.load().await.unwrap(), StoreDocument::default());
    }

    #[tokio::test]
    async fn test_unreadable_document_is_storage_error_and_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        // A directory at the document path cannot be read as a file.
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();
        let store = Store::open(&path).await.unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));

        let mut applied = false;
        let err = store
            .mutate(|doc| {
                applied = true;
                doc.images.clear();
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(!applied);

        assert!(path.is_dir());
        assert_eq!(std::fs::read(path.join("keep")).unwrap(), b"x");
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("db.json")]);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("db.json")).await.unwrap();
        let doc = sample_document();

        store.save(&doc).await.unwrap();
        assert_eq!(store.load().await.unwrap(), doc);
    }

    #[tokio::test]
    async fn test_save_of_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let store = Store::open(&path).await.unwrap();
        store.save(&sample_document()).await.unwrap();
        let before = std::fs::read(&path).unwrap();

        let doc = store.load().await.unwrap();
        store.save(&doc).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_reads_legacy_document_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(
            &path,
            r#"{
  "images": [
    {
      "id": "1712000000000abc123def",
      "category": "Vacations",
      "name": "beach.png",
      "path": "/uploads/1712000000000-beach.png"
    }
  ],
  "comments": [
    {
      "id": "1712000000001xyz",
      "category": "Vacations",
      "name": "Anonymous",
      "comment": "Take me there",
      "timestamp": "2024-04-01T19:33:20.001Z"
    }
  ]
}"#,
        )
        .unwrap();
        let store = Store::open(&path).await.unwrap();

        let doc = store.load().await.unwrap();
        assert_eq!(doc.images.len(), 1);
        assert_eq!(doc.images[0].caption, "");
        assert_eq!(doc.comments[0].timestamp, "2024-04-01T19:33:20.001Z");
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let store = Store::open(&path).await.unwrap();
        store.save(&sample_document()).await.unwrap();
        let before = std::fs::read(&path).unwrap();

        let result: Result<(), AppError> = store
            .mutate(|doc| {
                doc.images.push(ImageRecord::new(
                    "Life",
                    "b.jpg".into(),
                    "/uploads/b.jpg".into(),
                ));
                Err(AppError::Internal("simulated crash".into()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_save_cleans_up_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        // A non-empty directory at the target path makes the rename fail.
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();
        let store = Store::open(&path).await.unwrap();

        let err = store.save(&sample_document()).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("db.json")]);
    }

    #[tokio::test]
    async fn test_concurrent_mutations_do_not_lose_updates() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path().join("db.json")).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .mutate(|doc| {
                        doc.comments.push(CommentRecord::new(
                            "Life".into(),
                            None,
                            format!("comment {}", i),
                        ));
                        Ok(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.load().await.unwrap().comments.len(), 16);
    }
}
