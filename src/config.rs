//! Service configuration.
//!
//! Loaded from a TOML file given by:
//! 1. `--config <FILE>` on the command line
//! 2. `$EML_JSON_EXTRACT_CONFIG` (environment variable)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};
use crate::links::{DEFAULT_DRIVE_HOSTS, LinkMatcher};
use crate::types::LinkPattern;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "EML_JSON_EXTRACT_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub intake: IntakeConfig,
    pub links: LinksConfig,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

/// HTTP endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

/// Upload validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Reject uploads whose filename does not end in `.eml`.
    pub require_eml_extension: bool,
}

/// Which body links count as JSON resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub pattern: LinkPattern,
    /// Hosts accepted for "file view" links.
    pub drive_hosts: Vec<String>,
}

/// Outbound fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    /// Hosts for which TLS certificate verification is disabled.
    ///
    /// Every host not listed keeps full verification.
    pub insecure_hosts: Vec<String>,
    /// Largest accepted response body in bytes.
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// "error", "warn", "info", "debug" or "trace".
    pub level: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            max_upload_bytes: 25 * 1024 * 1024, // 25 MiB
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            require_eml_extension: true,
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            pattern: LinkPattern::default(),
            drive_hosts: DEFAULT_DRIVE_HOSTS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            insecure_hosts: Vec::new(),
            max_body_bytes: 10 * 1024 * 1024, // 10 MiB
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LinksConfig {
    #[must_use]
    pub fn matcher(&self) -> LinkMatcher {
        LinkMatcher::new(self.pattern).with_drive_hosts(self.drive_hosts.iter().cloned())
    }
}

// ── Load ────────────────────────────────────────────────────────

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ExtractError::Config(e.to_string()))
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))?;
        let config = Self::from_toml(&contents)?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load from an explicit path, then `$EML_JSON_EXTRACT_CONFIG`, then defaults.
    ///
    /// A file that is named but unreadable or invalid is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        path.map_or_else(|| Ok(Self::default()), |p| Self::from_file(&p))
    }
}
