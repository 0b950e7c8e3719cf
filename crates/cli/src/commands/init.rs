//! `microwave init`: scaffold a `.microwave/` project.

use color_eyre::Result;
use colored::Colorize;
use mw_core::init::generator::{generate_project_structure, InitOptions};
use std::path::Path;

pub async fn run(root: &Path, force: bool, minimal: bool) -> Result<()> {
    let project_dir = generate_project_structure(InitOptions {
        target_dir: root.to_path_buf(),
        force,
        minimal,
    })
    .await?;

    println!(
        "{} {}",
        "Initialized".green().bold(),
        project_dir.display()
    );
    println!("Put item models in the models directory as {{item}}_v{{stage}}.glb, then run `microwave`.");
    Ok(())
}
