//! Configuration data models
//!
//! This module defines the data structures used for application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default base URL of the stylization service
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Stylization service settings
    pub service: ServiceSettings,
    /// User preferences
    pub preferences: UserPreferences,
}

/// Where the stylization service lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Base URL; the endpoint path `/cartoonize/` is appended
    pub base_url: String,
}

/// User preferences and settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    /// Directory downloads are written to
    pub download_dir: PathBuf,
    /// Whether to write logs to the rotating log file (stderr otherwise)
    pub log_to_file: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVICE_URL.to_string(),
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("."),
            log_to_file: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.service.base_url, "http://localhost:8000");
        assert_eq!(config.preferences.download_dir, PathBuf::from("."));
        assert!(config.preferences.log_to_file);
    }

    #[test]
    fn test_serialization() {
        let mut config = AppConfig::default();
        config.service.base_url = "http://10.0.0.2:9000".to_string();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"service":{"base_url":"http://gpu-box:8000"}}"#).unwrap();
        assert_eq!(config.service.base_url, "http://gpu-box:8000");
        assert_eq!(config.preferences, UserPreferences::default());
    }
}
