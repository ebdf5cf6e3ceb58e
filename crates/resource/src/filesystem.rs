use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use vellum_traits::{ResourceError, ResourceProvider, SharedResourceData};

/// Serves assets from a directory, typically the one holding the deck JSON.
///
/// Paths that would leave the root (`..`, absolute paths, symlinks pointing
/// elsewhere) resolve to `NotFound`.
#[derive(Debug)]
pub struct FilesystemResourceProvider {
    root: PathBuf,
    canonical_root: Option<PathBuf>,
}

impl FilesystemResourceProvider {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let canonical_root = root.canonicalize().ok();
        Self { root, canonical_root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return None;
        }

        let full = self.root.join(relative);
        match (full.canonicalize(), &self.canonical_root) {
            (Ok(canonical), Some(root)) if canonical.starts_with(root) => Some(canonical),
            (Ok(_), Some(_)) => None,
            _ => Some(full),
        }
    }
}

impl ResourceProvider for FilesystemResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let full_path = self
            .resolve(path)
            .ok_or_else(|| ResourceError::NotFound(format!("{} (outside asset root)", path)))?;

        std::fs::read(&full_path)
            .map(Arc::new)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ResourceError::NotFound(path.to_string())
                } else {
                    ResourceError::LoadFailed {
                        path: path.to_string(),
                        message: e.to_string(),
                    }
                }
            })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path)
            .map(|p| p.exists())
            .unwrap_or(false)
    }

    fn base_path(&self) -> Option<&str> {
        self.root.to_str()
    }

    fn name(&self) -> &'static str {
        "FilesystemResourceProvider"
    }
}
