//! Configuration file loader for `.microwave/` directory structure.
//!
//! This module provides functionality to load and parse all configuration files
//! from the `.microwave/` directory, including:
//! - `config.toml`: Global settings
//! - `items/*.yaml`: Item catalog

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use crate::config::PROJECT_DIR;
use mw_protocol::config_models::GlobalConfig;
use mw_protocol::item_models::ItemDefinition;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Loads all configuration from the `.microwave/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.microwave/` folder
///
/// # Returns
///
/// An `AppConfig` containing all loaded configuration. If directories or files
/// are missing, the corresponding defaults are used rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid TOML or YAML syntax
/// - Two item files declare the same name, or an item name is empty
///
/// # Example
///
/// ```rust,no_run
/// use mw_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Cook cycles last {}s", config.global.cook_duration_secs);
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let project_dir = root.join(PROJECT_DIR);

    if !project_dir.exists() {
        debug!(path = %project_dir.display(), "No project directory, using defaults");
        return Ok(AppConfig {
            root: root.to_path_buf(),
            ..AppConfig::default()
        });
    }

    let global = load_global_config(&project_dir)?;
    let items = load_items(&project_dir)?;

    debug!(items = items.len(), "Loaded configuration");

    Ok(AppConfig {
        global,
        items,
        root: root.to_path_buf(),
    })
}

/// Loads global configuration from `config.toml`.
fn load_global_config(project_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = project_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let config: GlobalConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path,
            source,
        })?;

    Ok(config)
}

/// Loads all item definitions from `items/*.yaml` and `items/*.yml`.
fn load_items(project_dir: &Path) -> ConfigResult<Vec<ItemDefinition>> {
    let items_dir = project_dir.join("items");

    if !items_dir.exists() {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut seen = HashSet::new();

    for entry in WalkDir::new(&items_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: items_dir.clone(),
            source,
        })?;

        let path = entry.path();

        let ext = path.extension().and_then(|s| s.to_str());
        if ext != Some("yaml") && ext != Some("yml") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let item: ItemDefinition =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?;

        if item.name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig {
                path: path.to_path_buf(),
                reason: "item name must not be empty".to_string(),
            });
        }

        if !seen.insert(item.name.clone()) {
            return Err(ConfigError::InvalidConfig {
                path: path.to_path_buf(),
                reason: format!("duplicate item name '{}'", item.name),
            });
        }

        items.push(item);
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_config_full_project() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let project_dir = root.join(".microwave");

        fs::create_dir_all(project_dir.join("items")).expect("Failed to create items dir");

        let config_toml = r#"
cook-duration-secs = 6
models-dir = "assets"

[clips.door]
name = "Door"
duration-ms = 500
"#;
        fs::write(project_dir.join("config.toml"), config_toml)
            .expect("Failed to write config.toml");

        fs::write(
            project_dir.join("items/popcorn.yaml"),
            "name: popcorn\nlabel: Popcorn\ndescription: Pops.\n",
        )
        .expect("Failed to write item file");
        fs::write(project_dir.join("items/chicken.yml"), "name: chicken\n")
            .expect("Failed to write item file");

        let config = load_config(root).await.expect("Failed to load config");

        assert_eq!(config.global.cook_duration_secs, 6);
        assert_eq!(config.global.clips.door.name, "Door");
        assert_eq!(config.global.clips.door.duration_ms, 500);
        assert_eq!(config.models_dir(), root.join("assets"));

        // Sorted by file name
        assert_eq!(config.items.len(), 2);
        assert_eq!(config.items[0].name, "chicken");
        assert_eq!(config.items[1].name, "popcorn");
        assert_eq!(config.items[1].label, "Popcorn");
    }

    #[tokio::test]
    async fn test_load_config_empty_directory() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();

        let config = load_config(root)
            .await
            .expect("Should handle missing .microwave");

        assert_eq!(config.global, GlobalConfig::default());
        assert!(config.items.is_empty(), "Should have no items");
        assert_eq!(config.root, root);
    }

    #[tokio::test]
    async fn test_load_config_partial() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let project_dir = root.join(".microwave");

        fs::create_dir_all(&project_dir).expect("Failed to create .microwave");
        fs::write(project_dir.join("config.toml"), "cook-duration-secs = 3")
            .expect("Failed to write config.toml");

        let config = load_config(root)
            .await
            .expect("Should handle partial config");

        assert_eq!(config.global.cook_duration_secs, 3);
        assert_eq!(config.global.regions.door, "microwave_door");
        assert!(config.items.is_empty());
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let project_dir = root.join(".microwave");

        fs::create_dir_all(&project_dir).expect("Failed to create .microwave");
        fs::write(project_dir.join("config.toml"), "cook-duration-secs = = 3")
            .expect("Failed to write config.toml");

        let result = load_config(root).await;
        assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
    }

    #[tokio::test]
    async fn test_load_config_invalid_yaml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let project_dir = root.join(".microwave");

        fs::create_dir_all(project_dir.join("items")).expect("Failed to create items dir");
        fs::write(project_dir.join("items/broken.yaml"), "label: [unclosed")
            .expect("Failed to write item file");

        let result = load_config(root).await;
        match result {
            Err(ConfigError::YamlParse { path, .. }) => assert!(path.ends_with("broken.yaml")),
            other => panic!("Expected YamlParse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_config_rejects_duplicate_items() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let project_dir = root.join(".microwave");

        fs::create_dir_all(project_dir.join("items")).expect("Failed to create items dir");
        fs::write(project_dir.join("items/a.yaml"), "name: pizza")
            .expect("Failed to write item file");
        fs::write(project_dir.join("items/b.yaml"), "name: pizza")
            .expect("Failed to write item file");

        let result = load_config(root).await;
        match result {
            Err(ConfigError::InvalidConfig { reason, .. }) => {
                assert!(reason.contains("duplicate item name 'pizza'"))
            }
            other => panic!("Expected InvalidConfig error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_config_ignores_non_matching_files() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let project_dir = root.join(".microwave");

        fs::create_dir_all(project_dir.join("items")).expect("Failed to create items dir");
        fs::write(project_dir.join("items/notes.txt"), "Not a yaml file")
            .expect("Failed to write txt file");
        fs::write(project_dir.join("items/soup.yaml"), "name: soup")
            .expect("Failed to write item file");

        let config = load_config(root)
            .await
            .expect("Should ignore non-matching files");

        assert_eq!(config.items.len(), 1, "Should only load .yaml files");
        assert_eq!(config.items[0].name, "soup");
    }
}
