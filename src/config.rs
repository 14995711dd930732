use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};

use crate::services::session::RefreshSchedule;
use crate::spotify_rs::auth::SPOTIFY_SCOPES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    /// Public URL of this service, used for the OAuth redirect and help links
    pub base_url: Option<String>,
    /// Extra command phrasings, tried before the built-in ones
    pub commands: Vec<CommandPattern>,
    pub spotify: SpotifyConfig,
    pub session: SessionConfig,
}

/// A regular expression mapped to an intent name. Named groups become entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPattern {
    pub intent: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub refresh_schedule: RefreshSchedule,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            base_url: None,
            commands: Vec::new(),
            spotify: SpotifyConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            scopes: SPOTIFY_SCOPES.iter().map(|scope| scope.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("spotify-chat-commands").join("config.toml"))
    }

    /// Load the default config file, or defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config to the default path, unless a file is already there
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_else(|| eyre!("No config directory available"))?;
        if path.exists() {
            return Err(eyre!("Config file already exists: {}", path.display()));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let contents =
            toml::to_string_pretty(&Self::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }
}
