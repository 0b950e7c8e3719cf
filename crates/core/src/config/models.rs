//! Configuration models that aggregate all settings.
//!
//! This module provides the unified `AppConfig` structure that combines
//! global settings and the item catalog into a single configuration object.

use mw_protocol::config_models::GlobalConfig;
use mw_protocol::item_models::ItemDefinition;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Unified application configuration loaded from `.microwave/` directory.
///
/// This structure aggregates all configuration sources:
/// - `config.toml`: Global settings
/// - `items/*.yaml`: Item catalog
///
/// # Example
///
/// ```rust,no_run
/// use mw_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} items", config.items.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Global settings from `config.toml`.
    pub global: GlobalConfig,

    /// Item definitions from `items/*.yaml`, sorted by file name.
    pub items: Vec<ItemDefinition>,

    /// Directory the configuration was loaded from.
    ///
    /// Relative paths in `global` are resolved against it.
    pub root: PathBuf,
}

impl AppConfig {
    /// Look up an item by name.
    pub fn item(&self, name: &str) -> Option<&ItemDefinition> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Default length of one cook cycle.
    pub fn cook_duration(&self) -> Duration {
        Duration::from_secs(self.global.cook_duration_secs)
    }

    /// Absolute (or root-relative) model directory.
    pub fn models_dir(&self) -> PathBuf {
        resolve(&self.root, &self.global.models_dir)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
