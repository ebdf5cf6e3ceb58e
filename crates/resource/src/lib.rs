//! Asset resolution for the slide renderer.
//!
//! - [`FilesystemResourceProvider`]: assets below a directory root
//! - [`InMemoryResourceProvider`]: re-exported from vellum-traits
//! - [`fetch`]: resolves a raw URL from markup or CSS, decoding `data:` URIs
//!   inline and handing everything else to a provider

mod data_uri;
mod filesystem;

pub use data_uri::{decode_data_uri, DataUri};
pub use filesystem::FilesystemResourceProvider;
pub use vellum_traits::{InMemoryResourceProvider, ResourceError, ResourceProvider, SharedResourceData};

use std::sync::Arc;

/// Resolves a URL as written in the slide markup.
///
/// `data:` URIs are decoded without touching the provider. Remote URLs are
/// rejected since the renderer never goes to the network.
pub fn fetch(provider: &dyn ResourceProvider, url: &str) -> Result<SharedResourceData, ResourceError> {
    let url = url.trim();
    if url.starts_with("data:") {
        return decode_data_uri(url).map(|uri| Arc::new(uri.data));
    }
    let path = normalize_path(url)?;
    log::debug!("Loading '{}' through {}", path, provider.name());
    provider.load(&path)
}

/// Strips URL decoration so that `./img/a.png?v=2#x` and `img/a.png` hit the same asset.
pub fn normalize_path(url: &str) -> Result<String, ResourceError> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//") {
        return Err(ResourceError::UnsupportedScheme(url.to_string()));
    }
    let path = lower
        .strip_prefix("file://")
        .map(|_| &url[7..])
        .unwrap_or(url);
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_start_matches("./").trim_start_matches('/');
    if path.is_empty() {
        return Err(ResourceError::InvalidReference(url.to_string()));
    }
    Ok(path.to_string())
}
