//! Configuration management for the reviewer roster
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (ROSTER_*)
//! 3. Config file (~/.config/roster/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::selection::StrategyKind;
use crate::{Error, Result};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    pub address: String,

    /// Upper bound on a single request, including its unit of work
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// How long in-flight requests may run after a shutdown signal
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8080".to_string(),
            request_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(15),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file; defaults to `~/.cache/roster/roster.db`
    pub path: Option<PathBuf>,

    /// Maximum number of pooled connections
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
        }
    }
}

impl DatabaseSettings {
    /// Configured path or the default cache location
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("roster")
                .join("roster.db")
        })
    }
}

/// Reviewer assignment configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// How a reviewer is picked among eligible team members
    pub strategy: StrategyKind,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub assignment: AssignmentConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/roster/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("roster").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - ROSTER_ADDRESS: HTTP listen address
    /// - ROSTER_DATABASE_PATH: SQLite database file
    /// - ROSTER_STRATEGY: `random` or `least_loaded`
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(
            std::env::var("ROSTER_ADDRESS").ok(),
            std::env::var("ROSTER_DATABASE_PATH").ok().map(PathBuf::from),
            std::env::var("ROSTER_STRATEGY").ok(),
        )
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        self,
        address: Option<String>,
        database_path: Option<PathBuf>,
        strategy: Option<String>,
    ) -> Result<Self> {
        self.with_overrides(address, database_path, strategy)
    }

    fn with_overrides(
        mut self,
        address: Option<String>,
        database_path: Option<PathBuf>,
        strategy: Option<String>,
    ) -> Result<Self> {
        if let Some(address) = address {
            self.server.address = address;
        }

        if let Some(path) = database_path {
            self.database.path = Some(path);
        }

        if let Some(name) = strategy {
            self.assignment.strategy = StrategyKind::parse(&name)
                .ok_or_else(|| Error::Config(format!("Unknown selection strategy '{}'", name)))?;
        }

        Ok(self)
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        address: Option<String>,
        database_path: Option<PathBuf>,
        strategy: Option<String>,
    ) -> Result<Self> {
        Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(address, database_path, strategy)
    }
}
