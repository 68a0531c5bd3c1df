//! On-disk storage for uploaded image files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::errors::AppError;

/// URL prefix the uploads directory is served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// A file already written to the uploads directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Filename as sent by the client
    pub original_name: String,
    /// Filename inside the uploads directory
    pub stored_name: String,
}

impl StoredFile {
    /// Path clients fetch the file from.
    pub fn public_path(&self) -> String {
        format!("{}/{}", UPLOADS_ROUTE, self.stored_name)
    }
}

#[derive(Debug)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Open the uploads directory, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one uploaded file under a fresh unique name.
    pub async fn write(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, AppError> {
        let stored_name = format!(
            "{}-{}",
            uuid::Uuid::new_v4().simple(),
            sanitize_file_name(original_name)
        );
        tokio::fs::write(self.dir.join(&stored_name), bytes).await?;

        tracing::debug!("Stored upload {:?} as {}", original_name, stored_name);
        Ok(StoredFile {
            original_name: original_name.to_string(),
            stored_name,
        })
    }

    /// Remove the file an image record's `path` points at.
    pub async fn remove_by_path(&self, public_path: &str) -> std::io::Result<()> {
        let stored_name = stored_name_from_path(public_path).ok_or_else(|| {
            std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("{:?} is not inside {}", public_path, UPLOADS_ROUTE),
            )
        })?;
        tokio::fs::remove_file(self.dir.join(stored_name)).await
    }

    /// Best-effort removal of files written for a batch that was not committed.
    pub async fn discard(&self, files: &[StoredFile]) {
        for file in files {
            if let Err(e) = tokio::fs::remove_file(self.dir.join(&file.stored_name)).await {
                tracing::warn!("Failed to discard upload {}: {}", file.stored_name, e);
            }
        }
    }
}

/// Reduce a client-supplied filename to a safe single path component.
pub fn sanitize_file_name(original: &str) -> String {
    let last = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Extract the stored filename from `/uploads/<name>`, rejecting anything that
/// would escape the uploads directory.
fn stored_name_from_path(public_path: &str) -> Option<&str> {
    let name = public_path
        .strip_prefix(UPLOADS_ROUTE)?
        .strip_prefix('/')?;
    let valid = !name.is_empty()
        && !name.contains(['/', '\\'])
        && name != "."
        && name != "..";
    valid.then_some(name)
}
