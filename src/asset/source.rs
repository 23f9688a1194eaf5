//! Asset sources: where tile bytes come from.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::AssetError;

// =============================================================================
// AssetSource Trait
// =============================================================================

/// Read access to tile assets by relative path.
///
/// This abstraction lets the loader work with packaged assets, a directory on
/// disk, or an in-memory set without knowing which.
#[async_trait]
pub trait AssetSource: Send + Sync + 'static {
    /// Read the whole asset at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::NotFound`] if no asset exists at `path`.
    async fn open_for_read(&self, path: &str) -> Result<Bytes, AssetError>;
}

// =============================================================================
// Filesystem Source
// =============================================================================

/// Assets stored under a root directory.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` under the root, rejecting absolute paths and `..`.
    fn resolve(&self, path: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|component| {
            !matches!(component, Component::Normal(_) | Component::CurDir)
        });
        if path.is_empty() || escapes {
            return Err(AssetError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl AssetSource for FsAssetSource {
    async fn open_for_read(&self, path: &str) -> Result<Bytes, AssetError> {
        let full_path = self.resolve(path)?;
        match tokio::fs::read(&full_path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AssetError::NotFound(path.to_string())),
            Err(e) => Err(AssetError::Io {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

// =============================================================================
// In-Memory Source
// =============================================================================

/// Assets held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    assets: HashMap<String, Bytes>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset (builder style).
    pub fn with_asset(mut self, path: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Bytes>) {
        self.assets.insert(path.into(), data.into());
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[async_trait]
impl AssetSource for MemoryAssetSource {
    async fn open_for_read(&self, path: &str) -> Result<Bytes, AssetError> {
        self.assets
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}
