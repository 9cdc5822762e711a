//! Durable storage for uploaded images.

use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::error::{EventError, Result};
use crate::models::UploadedFile;

/// Reference to a stored upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Value written to the event's `image` field
    pub path: String,
    pub original_name: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persists the file and returns its reference.
    async fn store(&self, file: UploadedFile) -> Result<StoredFile>;

    /// Deletes a stored file. Already-missing files are not an error.
    async fn remove(&self, path: &str) -> Result<()>;
}

/// Writes uploads to `<dir>/<unix-millis>-<basename>`.
#[derive(Debug, Clone)]
pub struct DiskUploadStore {
    dir: PathBuf,
}

/// Attempts before giving up on name collisions within one millisecond.
const MAX_NAME_ATTEMPTS: u32 = 16;

impl DiskUploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the upload directory if missing.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    fn stored_name(millis: i64, attempt: u32, base: &str) -> String {
        if attempt == 0 {
            format!("{}-{}", millis, base)
        } else {
            format!("{}-{}-{}", millis, attempt, base)
        }
    }
}

/// Last path component of a client filename, for either separator.
fn basename(file_name: &str) -> &str {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "" | "." | ".." => "upload",
        base => base,
    }
}

#[async_trait]
impl UploadStore for DiskUploadStore {
    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.bytes.len()))]
    async fn store(&self, file: UploadedFile) -> Result<StoredFile> {
        self.ensure_dir().await?;

        let base = basename(&file.file_name);
        let millis = Utc::now().timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(Self::stored_name(millis, attempt, base));

            let mut handle = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(handle) => handle,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            handle.write_all(&file.bytes).await?;
            handle.flush().await?;

            let path = path.to_string_lossy().into_owned();
            debug!(path = %path, "Upload stored");
            return Ok(StoredFile {
                path,
                original_name: file.file_name,
            });
        }

        Err(EventError::Upload(format!(
            "could not find a free name for {:?}",
            base
        )))
    }

    #[instrument(skip(self))]
    async fn remove(&self, path: &str) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
