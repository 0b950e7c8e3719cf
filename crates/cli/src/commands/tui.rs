//! `microwave` / `microwave tui`: the interactive terminal UI.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::Path;
use tracing::info;

pub async fn run(root: &Path) -> Result<()> {
    let config = super::load(root).await?;
    info!(root = %root.display(), items = config.items.len(), "Launching TUI");

    mw_tui::run_app(config).await.map_err(|e| eyre!(e))
}
