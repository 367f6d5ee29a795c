//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level scheduler configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Scene scheduling settings.
    pub scene: SceneConfig,
    /// Debug/diagnostic settings.
    pub debug: DebugConfig,
}

/// Scene scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Ratio bounding `far / near` within one depth slice. Larger values
    /// produce fewer slices with coarser depth precision. Must be > 1.
    pub far_to_near_ratio: f64,
}

/// Debug/diagnostic configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Tint commands by which slices they overlap and collect statistics.
    pub show_frustums: bool,
    /// Tint each command a stable pseudo-random color.
    pub show_commands: bool,
    /// Redirect one slice's depth handoff to an inspectable target.
    pub show_globe_depth: bool,
    /// Which slice `show_globe_depth` inspects.
    pub show_globe_depth_frustum: u32,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            far_to_near_ratio: 1000.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_frustums: false,
            show_commands: false,
            show_globe_depth: false,
            show_globe_depth_frustum: 0,
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Default config directory under the platform config location.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stratum"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::Read)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::Parse)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::Write)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::Write)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::Read)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::Parse)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ratio_is_one_thousand() {
        let config = Config::default();
        assert_eq!(config.scene.far_to_near_ratio, 1000.0);
    }

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("far_to_near_ratio: 1000.0"));
        assert!(ron_str.contains("show_frustums: false"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.scene.far_to_near_ratio = 500.0;
        config.debug.show_commands = true;
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        // Config missing the `debug` section entirely.
        let ron_str = "(scene: (far_to_near_ratio: 250.0))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.scene.far_to_near_ratio, 250.0);
        assert_eq!(config.debug, DebugConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.scene.far_to_near_ratio = 100.0;
        config.debug.show_globe_depth = true;
        config.debug.show_globe_depth_frustum = 1;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.scene.far_to_near_ratio = 2000.0;
        modified.save(dir.path()).unwrap();
        let reloaded = config.reload(dir.path()).unwrap();
        assert_eq!(reloaded, Some(modified));
    }
}
