//! # dwell-config
//!
//! Layered configuration loading for Dwell using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`DWELL_*` prefix, `__` as separator)
//! 2. Project-level `.dwell/config.toml`
//! 3. User-level `~/.config/dwell/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `DWELL_GENAI__API_KEY` -> `genai.api_key`, `DWELL_RETRY__MAX_ATTEMPTS`
//! -> `retry.max_attempts`, etc. The `__` (double underscore) separates nested
//! config sections. When `genai.api_key` is still empty after all layers, the
//! conventional `GEMINI_API_KEY` and `API_KEY` variables are consulted.
//!
//! # Usage
//!
//! ```no_run
//! use dwell_config::DwellConfig;
//!
//! let config = DwellConfig::load_with_dotenv().expect("config");
//!
//! if !config.genai.is_configured() {
//!     eprintln!("no generative backend credential configured");
//! }
//! ```

mod error;
mod genai;
mod retry;
mod studio;

pub use error::ConfigError;
pub use genai::GenAiConfig;
pub use retry::RetrySettings;
pub use studio::StudioConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variables consulted, in order, when no API key is configured.
pub const API_KEY_FALLBACK_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DwellConfig {
    #[serde(default)]
    pub genai: GenAiConfig,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub studio: StudioConfig,
}

impl DwellConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env`
    /// file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed, or
    /// [`ConfigError::InvalidValue`] if a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Extract, apply credential fallbacks, and validate.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let mut config: Self = figment.extract()?;
        config.apply_api_key_fallback(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".dwell/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("DWELL_").split("__"))
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.genai.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "genai.base_url".into(),
                reason: "must not be empty".into(),
            });
        }
        match reqwest::Url::parse(self.genai.base_url.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            Ok(url) => {
                return Err(ConfigError::InvalidValue {
                    field: "genai.base_url".into(),
                    reason: format!("'{url}' is not an http(s) URL with a host"),
                });
            }
            Err(error) => {
                return Err(ConfigError::InvalidValue {
                    field: "genai.base_url".into(),
                    reason: format!("not a URL: {error}"),
                });
            }
        }
        if self.genai.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "genai.request_timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.studio.max_final_designs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "studio.max_final_designs".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Require a generative backend credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when `genai.api_key` is empty.
    pub fn require_genai(&self) -> Result<&GenAiConfig, ConfigError> {
        if self.genai.is_configured() {
            Ok(&self.genai)
        } else {
            Err(ConfigError::NotConfigured {
                section: "genai".into(),
            })
        }
    }

    /// Fill an empty `genai.api_key` from the first non-empty fallback variable.
    fn apply_api_key_fallback<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.genai.is_configured() {
            return;
        }
        if let Some(key) = API_KEY_FALLBACK_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            self.genai.api_key = key;
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dwell").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir looking
    /// for a `.env` file. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // Walk up at most 3 levels (crate -> crates/ -> workspace root)
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
