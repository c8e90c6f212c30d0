use crate::errors::StorageError;
use crate::models::Subject;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, warn};

/// Persists the whole subject collection as one JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file yields an empty collection.
    pub async fn load(&self) -> Vec<Subject> {
        match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<Subject>>(&bytes) {
                Ok(subjects) => {
                    info!(count = subjects.len(), path = %self.path.display(), "subjects loaded");
                    subjects
                }
                Err(err) => {
                    error!("failed to parse data file: {err}");
                    self.set_aside().await;
                    Vec::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                error!("failed to read data file: {err}");
                Vec::new()
            }
        }
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    /// Moves an unparseable file out of the way so the next save cannot clobber it.
    async fn set_aside(&self) {
        let backup = self.backup_path();
        match fs::rename(&self.path, &backup).await {
            Ok(()) => warn!(backup = %backup.display(), "unreadable data file moved aside"),
            Err(err) => error!(backup = %backup.display(), "failed to move data file aside: {err}"),
        }
    }

    pub async fn save(&self, subjects: &[Subject]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let payload = serde_json::to_vec_pretty(subjects)?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }

    /// Saves and logs failures instead of returning them; the in-memory
    /// collection stays authoritative when the disk write fails.
    pub async fn save_or_log(&self, subjects: &[Subject]) {
        if let Err(err) = self.save(subjects).await {
            error!(path = %self.path.display(), "failed to persist subjects: {err}");
        }
    }
}
