//! Runtime configuration
//!
//! Everything is read from the environment once at startup.
//!
//! | Variable | Default |
//! |---|---|
//! | `COMPLIANCE_PORT` | `8080` |
//! | `COMPLIANCE_BIND_ADDR` | `0.0.0.0` |
//! | `COMPLIANCE_LOG_LEVEL` | `info` |
//! | `COMPLIANCE_ADMIN_KEY` | required |
//! | `COMPLIANCE_PRIVATE_KEY_PATH` | `./private_key.bin` |
//! | `COMPLIANCE_CORS_ORIGINS` | `http://localhost:5173,http://localhost:3000` |
//! | `DATABASE_URL` | unset (in-memory store) |

use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;
use tracing::Level;

pub const ENV_PORT: &str = "COMPLIANCE_PORT";
pub const ENV_BIND_ADDR: &str = "COMPLIANCE_BIND_ADDR";
pub const ENV_LOG_LEVEL: &str = "COMPLIANCE_LOG_LEVEL";
pub const ENV_ADMIN_KEY: &str = "COMPLIANCE_ADMIN_KEY";
pub const ENV_PRIVATE_KEY_PATH: &str = "COMPLIANCE_PRIVATE_KEY_PATH";
pub const ENV_CORS_ORIGINS: &str = "COMPLIANCE_CORS_ORIGINS";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_PRIVATE_KEY_PATH: &str = "./private_key.bin";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is required")]
    Missing { name: &'static str },

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Allowed browser origins for the admin UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// `*`: any origin
    Any,
    /// Explicit allow-list
    List(Vec<String>),
}

/// Registry server configuration
#[derive(Clone)]
pub struct RegistryConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub log_level: Level,
    /// Shared secret expected in `X-Admin-Key`
    pub admin_key: String,
    pub private_key_path: PathBuf,
    pub cors_origins: CorsOrigins,
    /// PostgreSQL connection string; `None` selects the in-memory store
    pub database_url: Option<String>,
}

impl std::fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("admin_key", &"<redacted>")
            .field("private_key_path", &self.private_key_path)
            .field("cors_origins", &self.cors_origins)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl RegistryConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::vars().collect())
    }

    /// Build configuration from an explicit variable map
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = match lookup(&vars, ENV_PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: ENV_PORT,
                value: raw.to_string(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let raw_addr = lookup(&vars, ENV_BIND_ADDR).unwrap_or(DEFAULT_BIND_ADDR);
        let bind_addr = raw_addr.parse::<IpAddr>().map_err(|e| ConfigError::Invalid {
            name: ENV_BIND_ADDR,
            value: raw_addr.to_string(),
            reason: e.to_string(),
        })?;

        let log_level = match lookup(&vars, ENV_LOG_LEVEL) {
            Some(raw) => raw.parse::<Level>().map_err(|e| ConfigError::Invalid {
                name: ENV_LOG_LEVEL,
                value: raw.to_string(),
                reason: e.to_string(),
            })?,
            None => Level::INFO,
        };

        let admin_key = lookup(&vars, ENV_ADMIN_KEY)
            .ok_or(ConfigError::Missing {
                name: ENV_ADMIN_KEY,
            })?
            .to_string();

        let private_key_path =
            PathBuf::from(lookup(&vars, ENV_PRIVATE_KEY_PATH).unwrap_or(DEFAULT_PRIVATE_KEY_PATH));

        let cors_origins = parse_origins(lookup(&vars, ENV_CORS_ORIGINS).unwrap_or(DEFAULT_CORS_ORIGINS));

        Ok(Self {
            bind_addr,
            port,
            log_level,
            admin_key,
            private_key_path,
            cors_origins,
            database_url: lookup(&vars, ENV_DATABASE_URL).map(str::to_string),
        })
    }

    /// Configuration for tests and embedding: ephemeral port, in-memory store
    pub fn for_testing(admin_key: impl Into<String>, private_key_path: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            log_level: Level::DEBUG,
            admin_key: admin_key.into(),
            private_key_path: private_key_path.into(),
            cors_origins: CorsOrigins::Any,
            database_url: None,
        }
    }

    /// Socket address to bind the listener to
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

/// Non-empty, trimmed value of `name`
fn lookup<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_origins(raw: &str) -> CorsOrigins {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        CorsOrigins::Any
    } else {
        CorsOrigins::List(origins)
    }
}
