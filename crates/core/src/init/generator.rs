//! Directory structure and file generation for .microwave initialization.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use crate::config::PROJECT_DIR;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Item written when a minimal project is requested.
const MINIMAL_ITEM: &str = "items/popcorn.yaml";

/// Options for initializing a .microwave directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Target directory where .microwave will be created.
    pub target_dir: PathBuf,

    /// Overwrite existing .microwave directory if it exists.
    pub force: bool,

    /// Create minimal template (config and a single item).
    pub minimal: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
            minimal: false,
        }
    }
}

/// Generate a complete .microwave directory structure with templates.
///
/// This function creates the following structure:
/// ```text
/// .microwave/
/// ├── config.toml
/// └── items/
///     ├── popcorn.yaml
///     ├── pizza.yaml (unless minimal)
///     └── chicken.yaml (unless minimal)
/// ```
///
/// # Returns
/// The path of the created `.microwave` directory, or an `InitError` if:
/// - The .microwave directory already exists (without force flag)
/// - A template file cannot be found
/// - File system operations fail
pub async fn generate_project_structure(options: InitOptions) -> InitResult<PathBuf> {
    let project_dir = options.target_dir.join(PROJECT_DIR);

    if project_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(project_dir));
    }

    let items_dir = project_dir.join("items");
    fs::create_dir_all(&items_dir).map_err(|source| InitError::DirectoryCreate {
        path: items_dir.clone(),
        source,
    })?;

    write_template_file(&project_dir, "config.toml")?;

    if options.minimal {
        write_template_file(&project_dir, MINIMAL_ITEM)?;
    } else {
        for item_path in list_templates("items/") {
            write_template_file(&project_dir, &item_path)?;
        }
    }

    info!(path = %project_dir.display(), minimal = options.minimal, "Initialized project");

    Ok(project_dir)
}

/// Write one embedded template below the project directory.
fn write_template_file(project_dir: &Path, template_path: &str) -> InitResult<()> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::TemplateNotFound(template_path.to_string()))?;

    let target_path = project_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path,
        source,
    })?;

    Ok(())
}
