//! Embedded template files for .microwave initialization.
//!
//! This module uses `rust-embed` to embed template files from the workspace
//! root `templates/` directory into the binary at compile time, so the CLI
//! can scaffold a project without external files.

use rust_embed::RustEmbed;

/// Embedded template files from the `templates/` directory.
///
/// The path is calculated relative to the crate root:
/// - `CARGO_MANIFEST_DIR` = `crates/core`
/// - `../../templates` = workspace root `templates/`
///
/// With the `debug-embed` feature, debug builds embed the files as well,
/// so tests see the same content as release binaries.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Get template file content by path.
///
/// # Arguments
/// * `path` - Relative path from templates root (e.g., "config.toml", "items/popcorn.yaml")
///
/// # Returns
/// The file content as a String, or None if the file doesn't exist.
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// List all template files under a prefix, sorted.
///
/// # Arguments
/// * `prefix` - Directory prefix (e.g., "items/")
pub fn list_templates(prefix: &str) -> Vec<String> {
    let mut paths: Vec<String> = TemplateAssets::iter()
        .filter(|path| path.starts_with(prefix))
        .map(|path| path.to_string())
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config_template() {
        let config = get_template("config.toml");
        assert!(config.is_some(), "config.toml should be embedded");
        let content = config.unwrap();
        assert!(
            content.contains("cook-duration-secs ="),
            "config.toml should contain the cook duration"
        );
    }

    #[test]
    fn test_get_item_template() {
        let popcorn = get_template("items/popcorn.yaml");
        assert!(popcorn.is_some(), "items/popcorn.yaml should be embedded");
        assert!(popcorn.unwrap().contains("name: popcorn"));
    }

    #[test]
    fn test_get_nonexistent_template() {
        assert!(get_template("nonexistent.txt").is_none());
    }

    #[test]
    fn test_list_item_templates() {
        let items = list_templates("items/");
        assert_eq!(
            items,
            vec![
                "items/chicken.yaml".to_string(),
                "items/pizza.yaml".to_string(),
                "items/popcorn.yaml".to_string(),
            ]
        );
    }

    #[test]
    fn test_embedded_templates_parse() {
        let config: mw_protocol::GlobalConfig =
            toml::from_str(&get_template("config.toml").unwrap()).unwrap();
        assert_eq!(config, mw_protocol::GlobalConfig::default());

        for path in list_templates("items/") {
            let item: mw_protocol::ItemDefinition =
                serde_yaml::from_str(&get_template(&path).unwrap()).unwrap();
            assert!(path.ends_with(&format!("{}.yaml", item.name)));
        }
    }
}
