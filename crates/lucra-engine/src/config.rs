//! # Engine Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LUCRA_CACHE_BACKEND=redis                                          │
//! │     LUCRA_REDIS_URL=redis://cache:6379                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $LUCRA_CONFIG, or ./lucra.toml                                     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     in-memory cache, 6h / 1h TTLs, ./lucra.db                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/lucra/lucra.db"
//! max_connections = 8
//!
//! [cache]
//! backend = "redis"            # memory | redis | disabled
//! redis_url = "redis://127.0.0.1:6379"
//! projection_ttl_secs = 21600  # sales + cashflow
//! health_ttl_secs = 3600
//! single_flight = true
//!
//! [logging]
//! filter = "info,lucra_engine=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::projection_cache::CachePolicy;
use lucra_db::DbConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "LUCRA_CONFIG";

/// Config file used when `LUCRA_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "lucra.toml";

/// Longest TTL accepted for any cached result (7 days).
pub const MAX_TTL_SECS: u64 = 7 * 24 * 3600;

// =============================================================================
// Errors
// =============================================================================

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

// =============================================================================
// Cache Backend
// =============================================================================

/// Which cache implementation backs the projection cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
    Disabled,
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackend::Memory => write!(f, "memory"),
            CacheBackend::Redis => write!(f, "redis"),
            CacheBackend::Disabled => write!(f, "disabled"),
        }
    }
}

impl std::str::FromStr for CacheBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            "disabled" | "none" | "off" => Ok(CacheBackend::Disabled),
            _ => Err(ConfigError::InvalidValue(format!("cache backend '{s}'"))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `[database]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("lucra.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `[cache]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub backend: CacheBackend,

    /// Required when `backend = "redis"`.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// TTL of sales and cashflow projections.
    #[serde(default = "default_projection_ttl")]
    pub projection_ttl_secs: u64,

    /// TTL of health scores.
    #[serde(default = "default_health_ttl")]
    pub health_ttl_secs: u64,

    /// Coalesce concurrent misses on the same key into one computation.
    #[serde(default = "default_true")]
    pub single_flight: bool,
}

fn default_projection_ttl() -> u64 {
    6 * 3600
}

fn default_health_ttl() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            backend: CacheBackend::default(),
            redis_url: None,
            projection_ttl_secs: default_projection_ttl(),
            health_ttl_secs: default_health_ttl(),
            single_flight: default_true(),
        }
    }
}

impl CacheSettings {
    /// TTLs and flags the projection cache runs with.
    pub fn policy(&self) -> CachePolicy {
        CachePolicy {
            projection_ttl: Duration::from_secs(self.projection_ttl_secs),
            health_ttl: Duration::from_secs(self.health_ttl_secs),
            single_flight: self.single_flight,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` wins when set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_filter(),
        }
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl EngineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`path`, else `$LUCRA_CONFIG`, else `./lucra.toml`)
    /// 3. `LUCRA_*` environment variables
    ///
    /// A missing default file is not an error; a missing explicit one is.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let explicit = path.or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(
            database = %config.database.path.display(),
            cache = %config.cache.backend,
            "Engine configuration loaded"
        );
        Ok(config)
    }

    /// Parses a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading engine config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses TOML text. Absent sections and keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `LUCRA_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(path) = lookup("LUCRA_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(max) = lookup("LUCRA_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_value("LUCRA_DATABASE_MAX_CONNECTIONS", &max)?;
        }
        if let Some(backend) = lookup("LUCRA_CACHE_BACKEND") {
            debug!(backend = %backend, "Overriding cache backend from environment");
            self.cache.backend = backend.parse()?;
        }
        if let Some(url) = lookup("LUCRA_REDIS_URL") {
            self.cache.redis_url = Some(url);
        }
        if let Some(ttl) = lookup("LUCRA_PROJECTION_TTL_SECS") {
            self.cache.projection_ttl_secs = parse_value("LUCRA_PROJECTION_TTL_SECS", &ttl)?;
        }
        if let Some(ttl) = lookup("LUCRA_HEALTH_TTL_SECS") {
            self.cache.health_ttl_secs = parse_value("LUCRA_HEALTH_TTL_SECS", &ttl)?;
        }
        if let Some(flag) = lookup("LUCRA_SINGLE_FLIGHT") {
            self.cache.single_flight = parse_value("LUCRA_SINGLE_FLIGHT", &flag)?;
        }
        if let Some(filter) = lookup("LUCRA_LOG") {
            self.logging.filter = filter;
        }
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.cache.backend == CacheBackend::Redis
            && self.cache.redis_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingRequired("cache.redis_url".into()));
        }

        for (name, ttl) in [
            ("cache.projection_ttl_secs", self.cache.projection_ttl_secs),
            ("cache.health_ttl_secs", self.cache.health_ttl_secs),
        ] {
            if ttl == 0 || ttl > MAX_TTL_SECS {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must be between 1 and {MAX_TTL_SECS}"
                )));
            }
        }

        Ok(())
    }

    /// Database pool configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
