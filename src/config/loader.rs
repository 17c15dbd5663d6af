use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::{Config, VIEW_PLACEHOLDER};
use crate::view::ViewName;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/comanda/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("comanda").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The server URL is http(s)
    /// - Both view path templates contain `{view}`
    /// - The initial view and every navigation entry are valid view names
    /// - Feed capacities and refresh intervals are non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.server.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(invalid(format!(
                "Server base_url '{}' must start with http:// or https://",
                base_url
            )));
        }

        for (field, template) in [
            ("fragment_path", &self.views.fragment_path),
            ("module_path", &self.views.module_path),
        ] {
            if !template.contains(VIEW_PLACEHOLDER) {
                return Err(invalid(format!(
                    "views.{} '{}' must contain {}",
                    field, template, VIEW_PLACEHOLDER
                )));
            }
        }

        ViewName::parse(&self.views.initial)
            .map_err(|_| invalid(format!("Initial view '{}' is not a valid view name", self.views.initial)))?;

        for item in &self.views.navigation {
            ViewName::parse(&item.view).map_err(|_| {
                invalid(format!("Navigation view '{}' is not a valid view name", item.view))
            })?;
        }

        let feeds = &self.feeds;
        if feeds.alerts_capacity == 0 || feeds.panel_alerts_capacity == 0 || feeds.activity_capacity == 0 {
            return Err(invalid("Feed capacities must be greater than zero".to_string()));
        }

        if self.refresh.dashboard_seconds == 0 || self.refresh.stats_seconds == 0 {
            return Err(invalid("Refresh intervals must be greater than zero".to_string()));
        }

        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::ValidationError { message }
}
