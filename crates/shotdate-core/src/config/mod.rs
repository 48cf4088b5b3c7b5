//! Configuration management for shotdate.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section is optional in the TOML file.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input handling
    pub processing: ProcessingConfig,

    /// Timestamp validation
    pub resolver: ResolverConfig,

    /// Metadata writing
    pub writer: WriterConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/org.shotdate.shotdate/config.toml
    /// - Linux: ~/.config/shotdate/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\shotdate\shotdate\config\config.toml
    ///
    /// Falls back to ~/.shotdate/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("org", "shotdate", "shotdate")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = shellexpand::tilde("~").into_owned();
                PathBuf::from(home).join(".shotdate").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.processing.supported_formats, vec!["jpeg", "png"]);
        assert_eq!(config.processing.parallel_workers, 1);
        assert_eq!(config.resolver.floor_year, 1990);
        assert_eq!(config.writer.subject, vec!["Screenshot"]);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[processing]"));
        assert!(toml.contains("[resolver]"));
        assert!(toml.contains("[writer]"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [processing]
            supported_formats = ["jpeg", "png", "webp"]

            [writer]
            subject = ["Screenshot", "Phone"]
            "#,
        )
        .unwrap();
        assert!(config.processing.allows("webp"));
        assert!(config.processing.allows("PNG"));
        assert!(!config.processing.allows("gif"));
        assert_eq!(config.processing.parallel_workers, 1);
        assert_eq!(config.writer.subject, vec!["Screenshot", "Phone"]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[resolver]\nfloor_year = 2000\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.resolver.floor_year, 2000);
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[processing\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
