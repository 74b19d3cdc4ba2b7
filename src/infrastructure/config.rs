use crate::domain::{
    config::BridgeConfig,
    error::{BridgeError, BridgeResult},
};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration manager: resolves the config file location and handles the
/// TOML round-trip.
pub struct ConfigManager {
    global_config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> BridgeResult<Self> {
        Ok(Self {
            global_config_path: Self::global_config_path()?,
        })
    }

    /// Load the global configuration, falling back to defaults when no file
    /// exists yet.
    pub fn load_config(&self) -> BridgeResult<BridgeConfig> {
        if self.global_config_path.exists() {
            self.load_config_from_path(&self.global_config_path)
        } else {
            Ok(BridgeConfig::default())
        }
    }

    pub fn load_config_from_path(&self, path: &Path) -> BridgeResult<BridgeConfig> {
        let content = fs::read_to_string(path).map_err(|e| BridgeError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| BridgeError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Write the configuration to the global path, creating directories as
    /// needed.
    pub fn save_config(&self, config: &BridgeConfig) -> BridgeResult<PathBuf> {
        if let Some(parent) = self.global_config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BridgeError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }
        self.save_config_to_path(&self.global_config_path, config)?;
        Ok(self.global_config_path.clone())
    }

    pub fn save_config_to_path(&self, path: &Path, config: &BridgeConfig) -> BridgeResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| BridgeError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| BridgeError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    fn global_config_path() -> BridgeResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| BridgeError::Config {
            message: "Could not determine home directory".to_string(),
        })?;

        Ok(home.join(".config").join("serbridge").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");

        let manager = ConfigManager::new().expect("Failed to create manager");
        let mut config = BridgeConfig::default();
        config.bridge.listen_port = 4000;
        config.bridge.auto_select_vendor = Some("arduino".to_string());

        manager
            .save_config_to_path(&path, &config)
            .expect("Failed to save config");
        let loaded = manager
            .load_config_from_path(&path)
            .expect("Failed to load config");

        assert_eq!(loaded.bridge.listen_port, 4000);
        assert_eq!(loaded.bridge.auto_select_vendor.as_deref(), Some("arduino"));
        assert_eq!(loaded.serial.baud_rate, config.serial.baud_rate);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let manager = ConfigManager::new().expect("Failed to create manager");
        let result = manager.load_config_from_path(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(BridgeError::Config { .. })));
    }
}
