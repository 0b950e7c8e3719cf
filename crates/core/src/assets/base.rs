//! Base ItemStageLoader trait and supporting types.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Opaque identifier of a loaded stage asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetHandle(u64);

impl AssetHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Unknown item type: {0}")]
    UnknownItem(String),

    #[error("No model for '{item_type}' stage {stage} at {}", path.display())]
    MissingModel {
        item_type: String,
        stage: u8,
        path: PathBuf,
    },

    #[error("Failed to load '{item_type}' stage {stage}: {reason}")]
    Backend {
        item_type: String,
        stage: u8,
        reason: String,
    },
}

/// Loads and unloads staged item assets.
#[async_trait]
pub trait ItemStageLoader: Send + Sync {
    /// Load the asset for `item_type` at `stage`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the asset does not exist or cannot be loaded.
    /// Nothing is left loaded on failure.
    async fn load(&self, item_type: &str, stage: u8) -> Result<AssetHandle, LoadError>;

    /// Release a previously loaded asset. Unknown handles are ignored.
    async fn unload(&self, handle: AssetHandle);
}
