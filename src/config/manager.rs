//! Reading and writing `config.json`
//!
//! The file lives at %APPDATA%\AiCartoonizer\config.json. Values that would
//! leave the client unable to reach the service are replaced by defaults when
//! loading, so a hand-edited file can't wedge startup.
//!
//! Loading runs before logging is configured (the log target is itself a
//! setting), so every fallback is returned as a warning in [`LoadedConfig`]
//! for the caller to report once a subscriber exists.

use crate::config::models::{AppConfig, DEFAULT_SERVICE_URL};
use crate::error::{CartoonizerError, Result, StringError};
use std::path::PathBuf;
use tracing::debug;

/// Application directory name under APPDATA
pub const APP_DIR_NAME: &str = "AiCartoonizer";

const CONFIG_FILE_NAME: &str = "config.json";

/// Configuration read from disk, with the fallbacks applied while reading it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadedConfig {
    /// Effective configuration
    pub config: AppConfig,
    /// One message per value or file that was replaced by a default
    pub warnings: Vec<String>,
}

/// Loads and persists [`AppConfig`]
pub struct ConfigManager;

impl ConfigManager {
    /// Directory holding the config file and the logs
    ///
    /// Falls back to `./AiCartoonizer` when APPDATA is unset.
    pub fn get_app_dir() -> PathBuf {
        let base = std::env::var_os("APPDATA").map_or_else(|| PathBuf::from("."), PathBuf::from);
        base.join(APP_DIR_NAME)
    }

    /// Full path of `config.json`
    pub fn get_config_path() -> PathBuf {
        Self::get_app_dir().join(CONFIG_FILE_NAME)
    }

    /// Create the application directory if it is missing
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_path = Self::get_config_path();
        let config_dir = config_path.parent().ok_or_else(|| {
            CartoonizerError::ConfigError(StringError::new("Config path has no parent directory"))
        })?;

        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    }

    /// Read the configuration, or defaults when there is nothing usable
    ///
    /// A missing file yields [`AppConfig::default`] silently. A file that
    /// fails to parse yields the defaults plus a warning. Only I/O errors on an
    /// existing file propagate.
    pub fn load() -> Result<LoadedConfig> {
        let config_path = Self::get_config_path();
        if !config_path.exists() {
            debug!("No configuration at {}, using defaults", config_path.display());
            return Ok(LoadedConfig::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let mut config: AppConfig = match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                return Ok(LoadedConfig {
                    config: AppConfig::default(),
                    warnings: vec![format!(
                        "Ignoring unreadable {} ({e}), using default settings",
                        config_path.display()
                    )],
                });
            }
        };

        let warnings = normalize(&mut config);
        debug!("Read configuration from {}", config_path.display());
        Ok(LoadedConfig { config, warnings })
    }

    /// Persist `config`, replacing the previous file in a single rename
    pub fn save(config: &AppConfig) -> Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let staging_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        std::fs::write(&staging_path, serde_json::to_string_pretty(config)?)?;
        std::fs::rename(&staging_path, &config_path)?;

        debug!("Configuration written to {}", config_path.display());
        Ok(())
    }
}

/// Repair values the client can't work with, describing each repair
fn normalize(config: &mut AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    let base_url = config.service.base_url.trim();
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        config.service.base_url = base_url.to_string();
    } else {
        warnings.push(format!(
            "Service URL '{}' is not an http(s) URL, using {DEFAULT_SERVICE_URL}",
            config.service.base_url
        ));
        config.service.base_url = DEFAULT_SERVICE_URL.to_string();
    }

    if config.preferences.download_dir.as_os_str().is_empty() {
        warnings.push("Empty download directory, using the current directory".to_string());
        config.preferences.download_dir = PathBuf::from(".");
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{AppdataGuard, create_test_dir};

    fn write_config(contents: &str) {
        let dir = ConfigManager::ensure_config_dir().unwrap();
        std::fs::write(dir.join(CONFIG_FILE_NAME), contents).unwrap();
    }

    #[test]
    fn test_config_path_is_inside_app_dir() {
        let temp_dir = create_test_dir();
        let _guard = AppdataGuard::new(&temp_dir);

        assert_eq!(
            ConfigManager::get_config_path(),
            temp_dir.path().join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
        );
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = create_test_dir();
        let _guard = AppdataGuard::new(&temp_dir);

        assert_eq!(ConfigManager::load().unwrap(), LoadedConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = create_test_dir();
        let _guard = AppdataGuard::new(&temp_dir);

        let mut config = AppConfig::default();
        config.service.base_url = "http://render-node:8000".to_string();
        config.preferences.log_to_file = false;
        ConfigManager::save(&config).unwrap();

        let app_dir = temp_dir.path().join(APP_DIR_NAME);
        assert!(app_dir.join(CONFIG_FILE_NAME).exists());
        assert!(!app_dir.join("config.json.tmp").exists());
        let loaded = ConfigManager::load().unwrap();
        assert_eq!(loaded.config, config);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let temp_dir = create_test_dir();
        let _guard = AppdataGuard::new(&temp_dir);

        write_config("{ not json");
        let loaded = ConfigManager::load().unwrap();
        assert_eq!(loaded.config, AppConfig::default());
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains(CONFIG_FILE_NAME));
        assert!(loaded.warnings[0].contains("default settings"));
    }

    #[test]
    fn test_unusable_service_url_is_replaced() {
        let temp_dir = create_test_dir();
        let _guard = AppdataGuard::new(&temp_dir);

        write_config(r#"{"service":{"base_url":"localhost:8000"},"preferences":{"download_dir":""}}"#);
        let LoadedConfig { config, warnings } = ConfigManager::load().unwrap();
        assert_eq!(config.service.base_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.preferences.download_dir, PathBuf::from("."));
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("localhost:8000"));
    }

    #[test]
    fn test_service_url_whitespace_is_trimmed() {
        let temp_dir = create_test_dir();
        let _guard = AppdataGuard::new(&temp_dir);

        write_config(r#"{"service":{"base_url":"  https://gpu-box:8443  "}}"#);
        let loaded = ConfigManager::load().unwrap();
        assert_eq!(loaded.config.service.base_url, "https://gpu-box:8443");
        assert!(loaded.warnings.is_empty());
    }
}
