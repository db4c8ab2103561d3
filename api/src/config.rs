//! Service configuration
//!
//! Everything comes from environment variables (a `.env` file is loaded by
//! `main`). Parsing goes through a lookup function so tests can supply a map
//! instead of mutating the process environment.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub bind_addr: SocketAddr,
    /// Large enough for a base64 profile photo
    pub max_body_bytes: usize,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            max_body_bytes: 5 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct GeoConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.countrystatecity.in/v1".to_string(),
            timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub session_ttl: Duration,
    pub default_username: String,
    pub default_email: String,
    /// Seeding the default admin is skipped when unset
    pub default_password: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(8 * 60 * 60),
            default_username: "admin".to_string(),
            default_email: "admin@example.com".to_string(),
            default_password: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub geo: GeoConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match var("BIND_ADDR") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidConfig(format!("Invalid BIND_ADDR '{raw}': {e}"))
            })?,
            None => HttpConfig::default().bind_addr,
        };
        let max_body_bytes = parse_or(&var, "MAX_BODY_BYTES", HttpConfig::default().max_body_bytes)?;
        let cors_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let database_url = var("DATABASE_URL");
        let backend = match var("STORAGE_BACKEND").map(|v| v.to_lowercase()).as_deref() {
            Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidConfig(format!(
                    "STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"
                )))
            }
            None => StorageBackend::Postgres,
        };
        if backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnv("DATABASE_URL".to_string()));
        }
        let max_connections = parse_or(&var, "DB_MAX_CONNECTIONS", 5u32)?;

        let geo_defaults = GeoConfig::default();
        let timeout_secs = parse_or(&var, "GEO_TIMEOUT_SECS", geo_defaults.timeout.as_secs())?;
        if !(1..=30).contains(&timeout_secs) {
            return Err(ConfigError::InvalidConfig(
                "GEO_TIMEOUT_SECS must be between 1 and 30 seconds".to_string(),
            ));
        }
        let cache_ttl_secs = parse_or(&var, "GEO_CACHE_TTL_SECS", geo_defaults.cache_ttl.as_secs())?;

        let admin_defaults = AdminConfig::default();
        let session_ttl_secs =
            parse_or(&var, "SESSION_TTL_SECS", admin_defaults.session_ttl.as_secs())?;
        if session_ttl_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "SESSION_TTL_SECS must be positive".to_string(),
            ));
        }

        let config = AppConfig {
            http: HttpConfig {
                bind_addr,
                max_body_bytes,
                cors_origins,
            },
            storage: StorageConfig {
                backend,
                database_url,
                max_connections,
            },
            geo: GeoConfig {
                api_key: var("CSC_API_KEY"),
                base_url: var("GEO_API_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(geo_defaults.base_url),
                timeout: Duration::from_secs(timeout_secs),
                cache_ttl: Duration::from_secs(cache_ttl_secs),
            },
            admin: AdminConfig {
                session_ttl: Duration::from_secs(session_ttl_secs),
                default_username: var("DEFAULT_ADMIN_USERNAME")
                    .unwrap_or(admin_defaults.default_username),
                default_email: var("DEFAULT_ADMIN_EMAIL").unwrap_or(admin_defaults.default_email),
                default_password: var("DEFAULT_ADMIN_PASSWORD"),
            },
        };

        info!(
            bind_addr = %config.http.bind_addr,
            backend = ?config.storage.backend,
            geo_api_key = config.geo.api_key.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidConfig(format!("Invalid {key} '{raw}': {e}"))),
        None => Ok(default),
    }
}
