//! Configuration loading and path resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/agritrack/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is not an error: the service logs a warning and
//! starts with defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "AGRITRACK_CONFIG";
/// Environment variables checked, in order, for the Gemini API key
pub const GEMINI_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

const APP_DIR: &str = "agritrack";

/// Top-level TOML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub host: String,
    pub port: u16,
    /// tracing filter directive (e.g. "info", "agritrack_ui=debug")
    pub log_level: String,
    /// Start with the sample haul log instead of an empty store
    pub seed_demo_data: bool,
    /// How many of the most recent records the summary sees
    pub summary_record_limit: usize,
    /// Quiet period after the last record change before summarizing
    pub summary_debounce_ms: u64,
    /// Now-playing refresh interval for a connected music session
    pub playback_poll_ms: u64,
    /// Preferences file; defaults to the platform data directory
    pub prefs_path: Option<PathBuf>,
    pub gemini: GeminiConfig,
    pub spotify: SpotifyConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5740,
            log_level: "info".to_string(),
            seed_demo_data: true,
            summary_record_limit: 20,
            summary_debounce_ms: 1000,
            playback_poll_ms: 5000,
            prefs_path: None,
            gemini: GeminiConfig::default(),
            spotify: SpotifyConfig::default(),
        }
    }
}

/// Generative-AI service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

/// Music-playback service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    /// Overrides the client id stored in preferences
    pub client_id: Option<String>,
    /// Where the authorize page sends the browser back to
    pub redirect_uri: Option<String>,
    pub api_base_url: String,
    pub accounts_url: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            redirect_uri: None,
            api_base_url: "https://api.spotify.com".to_string(),
            accounts_url: "https://accounts.spotify.com".to_string(),
        }
    }
}

impl TomlConfig {
    /// Socket address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Gemini key from TOML, falling back to the environment
    pub fn gemini_api_key(&self) -> Option<String> {
        let from_toml = self
            .gemini
            .api_key
            .as_ref()
            .filter(|k| is_valid_key(k))
            .cloned();
        if from_toml.is_some() {
            return from_toml;
        }

        GEMINI_KEY_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|k| is_valid_key(k))
    }

    /// Preferences file location
    pub fn prefs_path(&self) -> PathBuf {
        self.prefs_path.clone().unwrap_or_else(default_prefs_path)
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Pick the config file to read, without checking that it exists
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Load the resolved config, degrading to defaults when the file is missing
///
/// A file that exists but does not parse is still an error.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    // Priority 4: Compiled defaults
    let Some(path) = resolve_config_path(cli_arg) else {
        warn!("Could not determine config directory, using defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!("Config file not found at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let config = load_toml_config(&path)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Write config as TOML, creating parent directories
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// OS-dependent default preferences file
pub fn default_prefs_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join("prefs.toml"))
        .unwrap_or_else(|| PathBuf::from("./agritrack_data/prefs.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:5740");
        assert_eq!(config.summary_record_limit, 20);
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            port = 8080

            [gemini]
            api_key = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.gemini.api_key.as_deref(), Some("abc"));
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.spotify.api_base_url, "https://api.spotify.com");
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("k"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("  \t"));
    }
}
