//! Subcommand implementations.

pub mod cook;
pub mod init;
pub mod items;
pub mod tui;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use mw_core::config::loader::load_config;
use mw_core::config::models::AppConfig;
use std::path::Path;

/// Load the project configuration below `root`.
pub async fn load(root: &Path) -> Result<AppConfig> {
    load_config(root)
        .await
        .wrap_err_with(|| format!("Failed to load configuration from {}", root.display()))
}
