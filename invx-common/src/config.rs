//! Configuration loading
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ENV_BIND_ADDR: &str = "INVX_BIND_ADDR";
pub const ENV_DB_PATH: &str = "INVX_DB_PATH";
pub const ENV_OUTBOUND_BUFFER: &str = "INVX_OUTBOUND_BUFFER";
/// Explicit config file location, checked before the platform locations
pub const ENV_CONFIG_FILE: &str = "INVX_CONFIG";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5780";
pub const DEFAULT_OUTBOUND_BUFFER: usize = 32;

/// Metrics hub configuration
#[derive(Debug, Clone, PartialEq)]
pub struct HubConfig {
    /// Socket address the HTTP/WebSocket server binds to
    pub bind_addr: String,
    /// SQLite file holding metric samples
    pub db_path: PathBuf,
    /// Per-viewer outbound message queue length
    pub outbound_buffer: usize,
}

/// Values given on the command line; `None` falls through to lower tiers
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_addr: Option<String>,
    pub db_path: Option<PathBuf>,
    pub outbound_buffer: Option<usize>,
}

/// TOML config file contents; every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub db_path: Option<PathBuf>,
    pub outbound_buffer: Option<usize>,
}

impl HubConfig {
    /// Resolve configuration from CLI overrides, environment, config file and defaults
    ///
    /// A missing config file is not an error. A config file that exists but
    /// cannot be parsed is.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let file = match find_config_file() {
            Some(path) => {
                debug!("Loading config file: {}", path.display());
                Some(load_toml_config(&path)?)
            }
            None => {
                debug!("No config file found, using defaults");
                None
            }
        };

        let env = ConfigOverrides {
            bind_addr: std::env::var(ENV_BIND_ADDR).ok(),
            db_path: std::env::var(ENV_DB_PATH).ok().map(PathBuf::from),
            outbound_buffer: match std::env::var(ENV_OUTBOUND_BUFFER) {
                Ok(raw) => Some(raw.parse().map_err(|_| {
                    Error::Config(format!("{} must be a positive integer, got {:?}", ENV_OUTBOUND_BUFFER, raw))
                })?),
                Err(_) => None,
            },
        };

        Self::merge(overrides, env, file.unwrap_or_default())
    }

    /// Merge already-loaded tiers; first `Some` wins
    pub fn merge(cli: ConfigOverrides, env: ConfigOverrides, file: TomlConfig) -> Result<Self> {
        let outbound_buffer = cli
            .outbound_buffer
            .or(env.outbound_buffer)
            .or(file.outbound_buffer)
            .unwrap_or(DEFAULT_OUTBOUND_BUFFER);

        if outbound_buffer == 0 {
            return Err(Error::Config("outbound_buffer must be at least 1".to_string()));
        }

        Ok(Self {
            bind_addr: cli
                .bind_addr
                .or(env.bind_addr)
                .or(file.bind_addr)
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_path: cli
                .db_path
                .or(env.db_path)
                .or(file.db_path)
                .unwrap_or_else(default_db_path),
            outbound_buffer,
        })
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Locate the config file for this platform, if any
fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        warn!("{} points to missing file {}", ENV_CONFIG_FILE, path.display());
    }

    let user_config = dirs::config_dir().map(|d| d.join("invx").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/invx/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default location of the metrics database
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("invx"))
        .unwrap_or_else(|| PathBuf::from("./invx_data"))
        .join("invx.db")
}
