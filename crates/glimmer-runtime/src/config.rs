//! Client configuration loaded from TOML

use glimmer_core::{GlimmerError, Result};
use glimmer_particles::{RainTuning, SmokeTuning};
use glimmer_scene::EffectCapability;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Window size the scene is laid out for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}

/// Emitter tunable overrides; each table is applied over the built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub rain: Option<toml::value::Table>,
    #[serde(default)]
    pub overlay_rain: Option<toml::value::Table>,
    #[serde(default)]
    pub smoke: Option<toml::value::Table>,
}

/// Top-level config file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root of the texture tree; relative paths resolve against the config file
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,
    /// Atlas directories under the asset root, e.g. `"effects"`
    #[serde(default)]
    pub texture_directories: Vec<String>,
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Backend capabilities: `"overlay"` and/or `"shader"`
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub weather: WeatherConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            asset_root: default_asset_root(),
            texture_directories: Vec::new(),
            viewport: ViewportConfig::default(),
            capabilities: default_capabilities(),
            weather: WeatherConfig::default(),
        }
    }
}

fn default_asset_root() -> PathBuf {
    PathBuf::from("assets")
}

fn default_capabilities() -> Vec<String> {
    vec!["overlay".to_string()]
}

impl ClientConfig {
    /// Parse a config from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| GlimmerError::ConfigError(format!("Invalid client config: {}", e)))
    }

    /// Load a config file, resolving a relative asset root against its directory
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: ClientConfig = toml::from_str(&content).map_err(|e| {
            GlimmerError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        if config.asset_root.is_relative() {
            if let Some(dir) = path.parent() {
                config.asset_root = dir.join(&config.asset_root);
            }
        }
        Ok(config)
    }

    /// Capabilities the rendering backend offers
    pub fn effect_capabilities(&self) -> Result<Vec<EffectCapability>> {
        self.capabilities
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "overlay" => Ok(EffectCapability::Overlay),
                "shader" => Ok(EffectCapability::Shader),
                other => Err(GlimmerError::ConfigError(format!("Unknown capability '{}'", other))),
            })
            .collect()
    }

    pub fn rain_tuning(&self) -> RainTuning {
        match &self.weather.rain {
            Some(table) => RainTuning::from_toml(table, RainTuning::volumetric()),
            None => RainTuning::volumetric(),
        }
    }

    pub fn overlay_rain_tuning(&self) -> RainTuning {
        match &self.weather.overlay_rain {
            Some(table) => RainTuning::from_toml(table, RainTuning::overlay()),
            None => RainTuning::overlay(),
        }
    }

    pub fn smoke_tuning(&self) -> SmokeTuning {
        self.weather
            .smoke
            .as_ref()
            .map(SmokeTuning::from_toml)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_particles::Range;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let name = format!("glimmer_config_test_{}", uuid::Uuid::new_v4());
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("client.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ClientConfig::parse("").unwrap();
        assert_eq!(config.asset_root, PathBuf::from("assets"));
        assert_eq!(config.viewport, ViewportConfig::default());
        assert_eq!(config.effect_capabilities().unwrap(), vec![EffectCapability::Overlay]);
        assert_eq!(config.rain_tuning(), RainTuning::volumetric());
        assert_eq!(config.smoke_tuning(), SmokeTuning::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let path = temp_config(
            r#"
asset_root = "data"
texture_directories = ["effects", "tiles"]
capabilities = ["overlay", "Shader"]

[viewport]
width = 1024

[weather.rain]
drop_count = [5, 50]

[weather.smoke]
max_puffs = 4
"#,
        );
        let config = ClientConfig::load_from_file(&path).unwrap();
        assert_eq!(config.asset_root, path.parent().unwrap().join("data"));
        assert_eq!(config.texture_directories, vec!["effects", "tiles"]);
        assert_eq!(config.viewport.width, 1024);
        assert_eq!(config.viewport.height, 600);
        assert_eq!(config.effect_capabilities().unwrap().len(), 2);
        assert_eq!(config.rain_tuning().drop_count, Range::new(5.0, 50.0));
        assert_eq!(config.overlay_rain_tuning(), RainTuning::overlay());
        assert_eq!(config.smoke_tuning().max_puffs, 4);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_unknown_capability() {
        let config = ClientConfig::parse("capabilities = [\"raytracing\"]").unwrap();
        assert!(matches!(config.effect_capabilities(), Err(GlimmerError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(ClientConfig::parse("viewport = 3").is_err());
    }

    #[test]
    fn test_missing_file() {
        let name = format!("glimmer_missing_{}.toml", uuid::Uuid::new_v4());
        let path = std::env::temp_dir().join(name);
        assert!(matches!(ClientConfig::load_from_file(&path), Err(GlimmerError::IoError(_))));
    }
}
