//! `microwave items`: list the item catalog.

use color_eyre::Result;
use colored::Colorize;
use mw_core::config::models::AppConfig;
use std::path::Path;

pub async fn run(root: &Path, json: bool) -> Result<()> {
    let config = super::load(root).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config.items)?);
        return Ok(());
    }

    if config.items.is_empty() {
        println!("No items configured. Run `microwave init` to create some.");
        return Ok(());
    }

    for line in item_lines(&config) {
        println!("{line}");
    }
    Ok(())
}

/// One line per item: name, label, and whether its stage 1 model exists.
fn item_lines(config: &AppConfig) -> Vec<String> {
    let models_dir = config.models_dir();
    config
        .items
        .iter()
        .map(|item| {
            let has_model = models_dir.join(format!("{}_v1.glb", item.name)).is_file();
            let model = if has_model {
                "model ok".green()
            } else {
                "no model".dimmed()
            };
            let mut line = format!("{:<12} {:<16} {model}", item.name.bold(), item.display_label());
            if !item.description.is_empty() {
                line.push_str(&format!("  {}", item.description.dimmed()));
            }
            line
        })
        .collect()
}
