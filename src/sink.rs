//! Where finished documents go.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid file name '{0}'")]
    InvalidName(String),
    #[error("Sink is poisoned")]
    Poisoned,
}

/// Receives the finished document. Called once, after assembly succeeded.
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<(), SinkError>;
}

/// Writes documents into a directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn target(&self, file_name: &str) -> Result<PathBuf, SinkError> {
        let name = Path::new(file_name);
        let plain = name.file_name().is_some_and(|n| n == name.as_os_str());
        if file_name.is_empty() || !plain {
            return Err(SinkError::InvalidName(file_name.to_string()));
        }
        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl OutputSink for FileSink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        let path = self.target(file_name)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, bytes).await?;
        log::info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

/// Keeps documents in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every saved document, oldest first.
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.files.lock().map(|f| f.len()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<(String, Vec<u8>)> {
        self.files.lock().ok().and_then(|f| f.last().cloned())
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        let mut files = self.files.lock().map_err(|_| SinkError::Poisoned)?;
        files.push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}
