//! Configuration management for safeguard.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::profile::DEFAULT_SLUG_LENGTH;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "safeguard";

/// Default profile database file name.
const DATABASE_FILE_NAME: &str = "profiles.db";

/// Default local cache file name.
const CACHE_FILE_NAME: &str = "local-cache.db";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "SAFEGUARD_";

/// Allowed range of generated slug lengths.
pub const SLUG_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 4..=32;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SAFEGUARD_`, sections separated
///    by `__`, e.g. `SAFEGUARD_PUBLIC__BASE_URL`)
/// 2. TOML config file at `~/.config/safeguard/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Public page configuration.
    pub public: PublicConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the profile database.
    /// Defaults to `~/.local/share/safeguard/profiles.db`
    pub database_path: Option<PathBuf>,
    /// Path to the local fallback cache.
    /// Defaults to `~/.local/share/safeguard/local-cache.db`
    pub cache_path: Option<PathBuf>,
}

/// Public page configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicConfig {
    /// Origin that share URLs and QR payloads are built on.
    pub base_url: String,
    /// Number of random characters in newly generated slugs.
    pub slug_length: usize,
    /// Numbers listed on the not-found page.
    pub emergency_numbers: Vec<String>,
}

impl Default for PublicConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            slug_length: DEFAULT_SLUG_LENGTH,
            emergency_numbers: vec!["101".to_string(), "100".to_string(), "102".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let config: Config = Self::figment(&config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let base_url = &self.public.base_url;
        let scheme = Regex::new(r"^https?://[^/\s]+").expect("Invalid regex pattern");
        if !scheme.is_match(base_url) {
            return Err(Error::ConfigValidation {
                message: format!("base_url must start with http:// or https://: {base_url}"),
            });
        }
        if base_url.ends_with('/') {
            return Err(Error::ConfigValidation {
                message: format!("base_url must not end with '/': {base_url}"),
            });
        }

        if !SLUG_LENGTH_RANGE.contains(&self.public.slug_length) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "slug_length ({}) must be between {} and {}",
                    self.public.slug_length,
                    SLUG_LENGTH_RANGE.start(),
                    SLUG_LENGTH_RANGE.end()
                ),
            });
        }

        if self.public.emergency_numbers.is_empty()
            || self
                .public
                .emergency_numbers
                .iter()
                .any(|n| n.trim().is_empty())
        {
            return Err(Error::ConfigValidation {
                message: "emergency_numbers must list at least one non-empty number".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the local cache path, resolving defaults if not set.
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.storage
            .cache_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(CACHE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert!(config.storage.cache_path.is_none());
        assert_eq!(config.public.base_url, "http://localhost:5173");
        assert_eq!(config.public.slug_length, 9);
        assert_eq!(config.public.emergency_numbers, vec!["101", "100", "102"]);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_base_url_scheme() {
        let mut config = Config::default();
        config.public.base_url = "ftp://example.com".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("base_url"));
    }

    #[test]
    fn test_validate_base_url_trailing_slash() {
        let mut config = Config::default();
        config.public.base_url = "https://sg.example/".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("must not end"));
    }

    #[test]
    fn test_validate_slug_length() {
        let mut config = Config::default();
        config.public.slug_length = 3;
        assert!(config.validate().is_err());

        config.public.slug_length = 33;
        assert!(config.validate().is_err());

        config.public.slug_length = 32;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_emergency_numbers() {
        let mut config = Config::default();
        config.public.emergency_numbers.clear();
        assert!(config.validate().is_err());

        config.public.emergency_numbers = vec![" ".to_string()];
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("emergency_numbers"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("safeguard"));
        assert!(path.to_string_lossy().contains("profiles.db"));
    }

    #[test]
    fn test_cache_path_default() {
        let path = Config::default().cache_path();
        assert!(path.to_string_lossy().contains("local-cache.db"));
    }

    #[test]
    fn test_paths_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/profiles.sqlite"));
        config.storage.cache_path = Some(PathBuf::from("/custom/cache.sqlite"));

        assert_eq!(config.database_path(), PathBuf::from("/custom/profiles.sqlite"));
        assert_eq!(config.cache_path(), PathBuf::from("/custom/cache.sqlite"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("safeguard"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
            [storage]
            database_path = "/srv/safeguard/profiles.db"

            [public]
            base_url = "https://safeguard.example"
            emergency_numbers = ["112"]
            "#,
        );

        let config = Config::load_from(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(
            config.database_path(),
            PathBuf::from("/srv/safeguard/profiles.db")
        );
        assert_eq!(config.public.base_url, "https://safeguard.example");
        assert_eq!(config.public.emergency_numbers, vec!["112"]);
        assert_eq!(config.public.slug_length, DEFAULT_SLUG_LENGTH);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let file = write_config(
            r"
            [public]
            slug_length = 2
            ",
        );

        let err = Config::load_from(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_load_file_section_keeps_other_defaults() {
        let file = write_config(
            r#"
            [storage]
            cache_path = "/tmp/safeguard-cache.db"
            "#,
        );

        let config = Config::load_from(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.cache_path(), PathBuf::from("/tmp/safeguard-cache.db"));
        assert_eq!(config.storage.database_path, None);
        assert_eq!(config.public, PublicConfig::default());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let file = write_config("[public\nbase_url = ");
        let err = Config::load_from(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }

    #[test]
    fn test_public_config_deserialize_partial() {
        let json = r#"{"base_url": "https://sg.example"}"#;
        let public: PublicConfig = serde_json::from_str(json).unwrap();
        assert_eq!(public.base_url, "https://sg.example");
        assert_eq!(public.slug_length, 9);
        assert_eq!(public.emergency_numbers.len(), 3);
    }

    #[test]
    fn test_config_serialize_to_toml_shape() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json["public"]["base_url"].is_string());
        assert!(json["storage"]["database_path"].is_null());
    }
}
