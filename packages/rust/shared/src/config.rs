//! Application configuration for daf.
//!
//! User config lives at `~/.daf/daf.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DafError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "daf.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".daf";

// ---------------------------------------------------------------------------
// Config structs (matching daf.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream text provider settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Fan-out limits.
    #[serde(default)]
    pub fetch: FetchLimitsConfig,
}

/// `[upstream]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// API root, without a trailing slash (e.g. `https://www.sefaria.org/api`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout enforced by the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.sefaria.org/api".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchLimitsConfig {
    /// Upper bound on in-flight comment detail requests.
    #[serde(default = "default_max_concurrent_comments")]
    pub max_concurrent_comments: usize,
}

impl Default for FetchLimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_comments: default_max_concurrent_comments(),
        }
    }
}

fn default_max_concurrent_comments() -> usize {
    50
}

// ---------------------------------------------------------------------------
// Fetch config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime fetch configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// API root URL, trailing slash stripped.
    pub base_url: String,
    /// HTTP client timeout.
    pub timeout: Duration,
    /// Wave-2 batch size. Always at least 1.
    pub max_concurrent_comments: usize,
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.upstream.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.upstream.timeout_secs),
            max_concurrent_comments: config.fetch.max_concurrent_comments.max(1),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.daf/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| DafError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.daf/daf.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DafError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| DafError::config(format!("failed to parse {}: {e}", path.display())))?;
    validate(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DafError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| DafError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DafError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject values that would make every request fail.
pub fn validate(config: &AppConfig) -> Result<()> {
    let base = &config.upstream.base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(DafError::config(format!(
            "upstream.base_url must be an http(s) URL, got '{base}'"
        )));
    }
    if config.fetch.max_concurrent_comments == 0 {
        return Err(DafError::config(
            "fetch.max_concurrent_comments must be at least 1",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("max_concurrent_comments"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[fetch]
max_concurrent_comments = 8
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.fetch.max_concurrent_comments, 8);
        assert_eq!(config.upstream.base_url, "https://www.sefaria.org/api");
        assert_eq!(config.upstream.timeout_secs, 30);
    }

    #[test]
    fn fetch_config_from_app_config() {
        let mut app = AppConfig::default();
        app.upstream.base_url = "http://localhost:9000/api/".into();
        let fetch = FetchConfig::from(&app);
        assert_eq!(fetch.base_url, "http://localhost:9000/api");
        assert_eq!(fetch.timeout, Duration::from_secs(30));
        assert_eq!(fetch.max_concurrent_comments, 50);
    }

    #[test]
    fn validation_rejects_zero_batch() {
        let mut config = AppConfig::default();
        config.fetch.max_concurrent_comments = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn validation_rejects_non_http_base() {
        let mut config = AppConfig::default();
        config.upstream.base_url = "ftp://example.com".into();
        assert!(validate(&config).is_err());
        assert!(validate(&AppConfig::default()).is_ok());
    }
}
