//! Bootstrap configuration
//!
//! Settings needed before the database is open: where the data lives, what
//! address to bind, the token signing secret and the CORS origins.
//!
//! # Resolution order
//!
//! 1. Command-line argument or environment variable (both parsed by clap in
//!    the binaries and passed in as [`ConfigOverrides`])
//! 2. TOML config file
//! 3. Compiled default
//!
//! A missing TOML file is not an error: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "hobby_helper.db";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3002;

/// Origins allowed by CORS when none are configured (development clients)
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:8081",
    "http://localhost:3002",
    "http://192.168.0.211:3002",
];

/// Bootstrap configuration file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// JWT signing secret (optional, generated and stored in the database if absent)
    #[serde(default)]
    pub jwt_secret: Option<String>,

    #[serde(default)]
    pub allowed_origins: Option<Vec<String>>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub root_folder: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub jwt_secret: Option<String>,
}

/// Fully resolved bootstrap configuration
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub root_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub jwt_secret: Option<String>,
    pub allowed_origins: Vec<String>,
    pub log_level: String,
}

impl BootstrapConfig {
    /// Load the TOML file (if any) and merge it with the overrides
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let path = overrides
            .config_path
            .clone()
            .or_else(default_config_path);

        let toml_config = match path {
            Some(path) => load_toml_config(&path)?.unwrap_or_default(),
            None => {
                warn!("Could not determine config directory, using defaults");
                TomlConfig::default()
            }
        };

        Ok(Self::merge(overrides, toml_config))
    }

    /// Apply resolution order to already-loaded sources
    pub fn merge(overrides: ConfigOverrides, toml_config: TomlConfig) -> Self {
        let root_folder = overrides
            .root_folder
            .or(toml_config.root_folder)
            .unwrap_or_else(default_root_folder);

        let jwt_secret = overrides
            .jwt_secret
            .or(toml_config.jwt_secret)
            .filter(|s| !s.trim().is_empty());

        let allowed_origins = toml_config.allowed_origins.unwrap_or_else(|| {
            DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect()
        });

        Self {
            root_folder,
            host: overrides
                .host
                .or(toml_config.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(toml_config.port).unwrap_or(DEFAULT_PORT),
            jwt_secret,
            allowed_origins,
            log_level: toml_config.logging.level,
        }
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    /// `host:port` string for binding the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read and parse a TOML config file
///
/// Returns `Ok(None)` when the file does not exist; a file that exists but
/// fails to parse is an error.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        warn!("Config file not found at {}, using defaults", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(Some(config))
}

/// `<config dir>/hobby-helper/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("hobby-helper").join("config.toml"))
}

/// OS-dependent default data folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("hobby-helper"))
        .unwrap_or_else(|| PathBuf::from("./hobby_helper_data"))
}
