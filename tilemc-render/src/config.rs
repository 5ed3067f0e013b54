//! Per-world render configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Name shown by the web front-end. `<world>` is replaced with the world name.
    pub display_name: String,
    pub render: RenderSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Renderer keys, in execution order.
    pub renderers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Block info panel format. Empty disables the block info renderer.
    pub blockinfo: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            display_name: "<world>".to_string(),
            render: RenderSettings::default(),
            ui: UiSettings::default(),
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            renderers: vec!["basic".to_string()],
        }
    }
}

impl WorldConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse world config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read world config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid world config {}", path.display()))
    }

    pub fn display_name_for(&self, world_name: &str) -> String {
        self.display_name.replace("<world>", world_name)
    }

    pub fn blockinfo_enabled(&self) -> bool {
        !self.ui.blockinfo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = WorldConfig::from_json("{}").unwrap();
        assert_eq!(config, WorldConfig::default());
        assert_eq!(config.render.renderers, vec!["basic"]);
        assert!(!config.blockinfo_enabled());
    }

    #[test]
    fn test_partial_config() {
        let config = WorldConfig::from_json(
            r#"{ "render": { "renderers": ["basic", "night"] }, "ui": { "blockinfo": "<block>" } }"#,
        )
        .unwrap();
        assert_eq!(config.render.renderers, vec!["basic", "night"]);
        assert!(config.blockinfo_enabled());
        assert_eq!(config.display_name, "<world>");
    }

    #[test]
    fn test_display_name() {
        let config = WorldConfig {
            display_name: "The <world>".to_string(),
            ..Default::default()
        };
        assert_eq!(config.display_name_for("nether"), "The nether");
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        fs::write(&path, "{ not json").unwrap();

        let err = WorldConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("world.json"));
        assert!(WorldConfig::load(&dir.path().join("missing.json")).is_err());
    }
}
