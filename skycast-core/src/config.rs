use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    error::ConfigError,
    location::DEFAULT_IP_LOOKUP_URL,
    model::Coordinates,
    provider::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL},
};

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

fn default_ip_lookup() -> bool {
    true
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// model = "gemini-2.5-flash"
///
/// [location]
/// latitude = 40.0
/// longitude = -75.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,

    /// Whether the host may resolve its position from its public IP.
    #[serde(default = "default_ip_lookup")]
    pub ip_lookup: bool,
    pub ip_lookup_url: Option<String>,

    /// Fixed coordinates; skips location lookup entirely when set.
    /// Kept last so it serializes as a trailing `[location]` table.
    pub location: Option<Coordinates>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            base_url: None,
            ip_lookup: default_ip_lookup(),
            ip_lookup_url: None,
            location: None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Let an API key from the environment take precedence over the file.
    pub fn with_env_api_key(mut self, env_value: Option<String>) -> Self {
        if let Some(key) = non_blank(env_value.as_deref()) {
            self.api_key = Some(key.to_string());
        }
        self
    }

    /// Reads the first non-blank key among [`API_KEY_ENV_VARS`].
    pub fn api_key_from_env() -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Returns the API key, if one is configured and not blank.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key().ok_or(ConfigError::MissingApiKey)
    }

    pub fn model(&self) -> &str {
        non_blank(self.model.as_deref()).unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        non_blank(self.base_url.as_deref()).unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn ip_lookup_url(&self) -> &str {
        non_blank(self.ip_lookup_url.as_deref()).unwrap_or(DEFAULT_IP_LOOKUP_URL)
    }

    /// Configured fixed coordinates, validated.
    pub fn fixed_location(&self) -> Result<Option<Coordinates>, ConfigError> {
        match self.location {
            Some(coords) if !coords.is_valid() => Err(ConfigError::InvalidCoordinates {
                latitude: coords.latitude,
                longitude: coords.longitude,
            }),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        assert!(matches!(cfg.require_api_key(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());
        assert_eq!(cfg.api_key(), None);
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let cfg = cfg.with_env_api_key(Some("ENV_KEY".into()));
        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
    }

    #[test]
    fn blank_env_key_keeps_file_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let cfg = cfg.with_env_api_key(Some(" ".into())).with_env_api_key(None);
        assert_eq!(cfg.api_key(), Some("FILE_KEY"));
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = Config::default();
        assert_eq!(cfg.model(), DEFAULT_MODEL);
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.ip_lookup_url(), DEFAULT_IP_LOOKUP_URL);
        assert!(cfg.ip_lookup);
    }

    #[test]
    fn parses_toml_with_location() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"
            model = "gemini-2.0-flash"

            [location]
            latitude = 40.0
            longitude = -75.0
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key(), Some("KEY"));
        assert_eq!(cfg.model(), "gemini-2.0-flash");
        assert_eq!(cfg.fixed_location().unwrap(), Some(Coordinates::new(40.0, -75.0)));
        assert!(cfg.ip_lookup, "ip_lookup defaults to true when omitted");
    }

    #[test]
    fn out_of_range_location_is_rejected() {
        let cfg = Config {
            location: Some(Coordinates::new(120.0, 0.0)),
            ..Config::default()
        };
        assert!(matches!(
            cfg.fixed_location(),
            Err(ConfigError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn toml_round_trip_keeps_settings() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.ip_lookup = false;

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.api_key(), Some("KEY"));
        assert!(!back.ip_lookup);
    }
}
