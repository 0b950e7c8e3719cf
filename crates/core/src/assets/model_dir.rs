//! Model directory loader.
//!
//! Resolves stage assets as `{models_dir}/{item_type}_v{stage}.glb`.

use super::base::{AssetHandle, ItemStageLoader, LoadError};
use async_trait::async_trait;
use mw_protocol::appliance_models::ItemSlot;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Loads item stages from model files on disk.
pub struct ModelDirLoader {
    models_dir: PathBuf,

    /// When set, only these item types may be loaded.
    known_items: Option<HashSet<String>>,

    next_handle: AtomicU64,
    live: Mutex<HashMap<AssetHandle, ItemSlot>>,
}

impl ModelDirLoader {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            known_items: None,
            next_handle: AtomicU64::new(1),
            live: Mutex::new(HashMap::new()),
        }
    }

    /// Restrict loading to the given item catalog.
    pub fn with_known_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_items = Some(items.into_iter().map(Into::into).collect());
        self
    }

    /// Path of the model file for one item stage.
    pub fn model_path(&self, item_type: &str, stage: u8) -> PathBuf {
        model_path(&self.models_dir, item_type, stage)
    }

    /// Number of assets currently loaded.
    pub fn live_count(&self) -> usize {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The item stage a handle refers to, if it is still loaded.
    pub fn loaded(&self, handle: AssetHandle) -> Option<ItemSlot> {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&handle)
            .cloned()
    }
}

fn model_path(models_dir: &Path, item_type: &str, stage: u8) -> PathBuf {
    models_dir.join(format!("{item_type}_v{stage}.glb"))
}

#[async_trait]
impl ItemStageLoader for ModelDirLoader {
    async fn load(&self, item_type: &str, stage: u8) -> Result<AssetHandle, LoadError> {
        if let Some(known) = &self.known_items {
            if !known.contains(item_type) {
                return Err(LoadError::UnknownItem(item_type.to_string()));
            }
        }

        let path = self.model_path(item_type, stage);
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);

        if !is_file {
            return Err(LoadError::MissingModel {
                item_type: item_type.to_string(),
                stage,
                path,
            });
        }

        let handle = AssetHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                handle,
                ItemSlot {
                    item_type: item_type.to_string(),
                    stage,
                },
            );

        info!(%handle, item_type, stage, path = %path.display(), "Loaded model");
        Ok(handle)
    }

    async fn unload(&self, handle: AssetHandle) {
        let removed = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle);

        match removed {
            Some(slot) => {
                debug!(%handle, item_type = %slot.item_type, stage = slot.stage, "Unloaded model")
            }
            None => debug!(%handle, "Unload of unknown handle ignored"),
        }
    }
}
