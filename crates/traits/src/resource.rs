//! Resource lookup for slide assets.
//!
//! Slides reference images, background pictures and web fonts by URL. The
//! host resolves every such reference through a `ResourceProvider`, so the
//! same deck can be rendered from a directory, from memory, or from a bundle
//! shipped by the caller.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to load resource '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("Malformed resource reference: {0}")]
    InvalidReference(String),

    #[error("Unsupported resource scheme in '{0}'")]
    UnsupportedScheme(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

pub type SharedResourceData = Arc<Vec<u8>>;

/// Loads the bytes behind a relative asset path.
///
/// Implementations only see plain paths. Inline `data:` URIs and URL
/// decoration (query strings, fragments, leading `./`) are handled before a
/// provider is consulted.
pub trait ResourceProvider: Send + Sync + Debug {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError>;

    fn exists(&self, path: &str) -> bool;

    /// Root the provider resolves against, when it has one.
    fn base_path(&self) -> Option<&str> {
        None
    }

    fn name(&self) -> &'static str;
}

/// Assets held in memory, keyed by path.
#[derive(Debug, Default)]
pub struct InMemoryResourceProvider {
    assets: RwLock<HashMap<String, SharedResourceData>>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for fixtures and embedded decks.
    pub fn with_asset(self, path: impl Into<String>, data: Vec<u8>) -> Self {
        if let Ok(mut assets) = self.assets.write() {
            assets.insert(path.into(), Arc::new(data));
        }
        self
    }

    /// # Errors
    ///
    /// Returns `ResourceError::LoadFailed` if the asset store lock is poisoned.
    pub fn add(&self, path: impl Into<String>, data: Vec<u8>) -> Result<(), ResourceError> {
        let path = path.into();
        let mut assets = self.assets.write().map_err(|_| ResourceError::LoadFailed {
            path: path.clone(),
            message: "asset store lock poisoned".to_string(),
        })?;
        assets.insert(path, Arc::new(data));
        Ok(())
    }

    pub fn remove(&self, path: &str) -> Option<SharedResourceData> {
        self.assets.write().ok()?.remove(path)
    }

    pub fn len(&self) -> usize {
        self.assets.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceProvider for InMemoryResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let assets = self.assets.read().map_err(|_| ResourceError::LoadFailed {
            path: path.to_string(),
            message: "asset store lock poisoned".to_string(),
        })?;
        assets
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.assets
            .read()
            .map(|a| a.contains_key(path))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryResourceProvider"
    }
}
