//! Configuration file handling.
//!
//! This module provides loading and saving of libscan configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/libscan/config.toml`
//! - macOS: `~/Library/Application Support/libscan/config.toml`
//! - Windows: `%APPDATA%\libscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! api_url = "https://api.github.com/advisories"
//! request_timeout_secs = 30
//! concurrency = 4
//! use_cache = true
//! cache_ttl_hours = 24
//! default_format = "table"
//! log_level = "warn"
//!
//! [ignore]
//! packages = ["@internal/*"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no `api_token` is configured.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Application configuration.
///
/// Every field has a default, so a partial file (or none at all) is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Advisory endpoint queried once per package.
    ///
    /// Default: `https://api.github.com/advisories`
    pub api_url: String,

    /// Bearer token sent with each request. Falls back to `GITHUB_TOKEN`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// `User-Agent` header; the GitHub API rejects requests without one.
    pub user_agent: String,

    /// Per-request timeout in seconds. `0` disables the timeout.
    ///
    /// Default: 30
    pub request_timeout_secs: u64,

    /// Maximum advisory queries in flight. `1` queries strictly one at a time.
    ///
    /// Default: 1
    pub concurrency: usize,

    /// Whether clean advisory lookups are cached on disk.
    ///
    /// Default: true
    pub use_cache: bool,

    /// How long cached lookups stay valid, in hours.
    ///
    /// Default: 24 hours
    pub cache_ttl_hours: u64,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json", "sarif"
    /// Default: "table"
    pub default_format: String,

    /// Log filter used when `RUST_LOG` is not set.
    ///
    /// Default: "warn"
    pub log_level: String,

    /// Ignore list configuration for suppressing known issues.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Packages that are never sent to the advisory source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Package names to skip. Supports glob patterns (e.g., "@internal/*").
    pub packages: Vec<String>,
}

impl IgnoreConfig {
    /// Check if a package should be ignored.
    pub fn should_ignore_package(&self, name: &str) -> bool {
        self.packages.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, name)
            } else {
                pattern == name
            }
        })
    }
}

/// Simple glob matching (supports * as wildcard).
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    // Check prefix (before first *)
    if !parts[0].is_empty() {
        if !remaining.starts_with(parts[0]) {
            return false;
        }
        remaining = &remaining[parts[0].len()..];
    }

    // Check suffix (after last *)
    let last_part = parts[parts.len() - 1];
    if !last_part.is_empty() {
        if !remaining.ends_with(last_part) {
            return false;
        }
        remaining = &remaining[..remaining.len() - last_part.len()];
    }

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        if let Some(pos) = remaining.find(part) {
            remaining = &remaining[pos + part.len()..];
        } else {
            return false;
        }
    }

    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com/advisories".to_string(),
            api_token: None,
            user_agent: format!("libscan/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            concurrency: 1,
            use_cache: true,
            cache_ttl_hours: 24,
            default_format: "table".to_string(),
            log_level: "warn".to_string(),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from an explicit path, falling back to defaults
    /// when the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("libscan")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Configured token, or `GITHUB_TOKEN` from the environment.
    pub fn resolved_token(&self) -> Option<String> {
        self.api_token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .filter(|token| !token.trim().is_empty())
    }
}
