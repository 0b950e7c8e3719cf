//! `tracing` subscriber setup.
//!
//! The terminal UI owns the screen, so in that mode logs go to a file.
//! Headless commands keep stdout for their own output and log to stderr.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use mw_core::config::PROJECT_DIR;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;

/// `.microwave/microwave.log` when the project exists, otherwise a file in
/// the system temp directory so that launching the UI does not create a
/// half-initialized project.
pub fn default_log_file(root: &Path) -> PathBuf {
    let project_dir = root.join(PROJECT_DIR);
    if project_dir.is_dir() {
        project_dir.join("microwave.log")
    } else {
        std::env::temp_dir().join("microwave.log")
    }
}

/// Log to stderr.
pub fn init_stderr(level: Level) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| eyre!("Failed to install logger: {err}"))
}

/// Append logs to `path`, creating it if needed.
pub fn init_file(level: Level, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| eyre!("Failed to install logger: {err}"))
}
