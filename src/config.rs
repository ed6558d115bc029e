use std::fmt;
use std::path::{Path, PathBuf};

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::captions::FALLBACK_LANG;
use crate::error::ConfigError;
use crate::metadata::DEFAULT_METADATA_BASE_URL;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Optional settings file. The API key is deliberately not read from here.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub default_lang: Option<String>,
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub metadata_base_url: Option<String>,
}

impl Config {
    /// Load config from `path` if it exists
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("tubescript")
        .join("config.toml")
}

/// Whether the binary binds its own listener
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExecutionMode {
    #[default]
    Standalone,
    /// An external host invokes the router; no socket is bound.
    Hosted,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Standalone => write!(f, "standalone"),
            ExecutionMode::Hosted => write!(f, "hosted"),
        }
    }
}

/// Values from flags or the environment; these win over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub lang: Option<String>,
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub mode: ExecutionMode,
}

/// Fully resolved runtime settings
#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub default_lang: Option<String>,
    pub port: u16,
    pub bind: String,
    pub mode: ExecutionMode,
    pub metadata_base_url: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("default_lang", &self.default_lang)
            .field("port", &self.port)
            .field("bind", &self.bind)
            .field("mode", &self.mode)
            .field("metadata_base_url", &self.metadata_base_url)
            .finish()
    }
}

impl Settings {
    pub fn resolve(overrides: Overrides, config: Config) -> Result<Self, ConfigError> {
        let api_key = overrides
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            api_key,
            default_lang: overrides
                .lang
                .or(config.default_lang)
                .filter(|l| !l.is_empty()),
            port: overrides.port.or(config.port).unwrap_or(DEFAULT_PORT),
            bind: overrides
                .bind
                .or(config.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            mode: overrides.mode,
            metadata_base_url: config
                .metadata_base_url
                .unwrap_or_else(|| DEFAULT_METADATA_BASE_URL.to_string()),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Language a request without `lang` will use
    pub fn effective_default_lang(&self) -> &str {
        self.default_lang.as_deref().unwrap_or(FALLBACK_LANG)
    }
}
