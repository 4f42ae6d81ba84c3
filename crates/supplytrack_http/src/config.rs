//! Server configuration.
//!
//! # Invariants
//! - `db_path` is never empty.
//! - `bind_addr` parses as a socket address before the server binds.
//! - `log_dir`, when set, is absolute (checked again by logging init).

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DB_FILE_NAME: &str = "supplytrack.sqlite3";
/// Matches the common JSON body-parser default of 100 KiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: supplytrack_core::default_log_level().to_string(),
            log_dir: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Checks the configuration and returns the parsed bind address.
    pub fn validate(&self) -> Result<SocketAddr, ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDbPath);
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        self.bind_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::InvalidBindAddr {
                value: self.bind_addr.clone(),
                reason: err.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDbPath,
    RelativeLogDir(PathBuf),
    ZeroBodyLimit,
    InvalidBindAddr { value: String, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDbPath => write!(f, "db_path cannot be empty"),
            Self::RelativeLogDir(dir) => {
                write!(f, "log_dir must be an absolute path, got `{}`", dir.display())
            }
            Self::ZeroBodyLimit => write!(f, "max_body_bytes must be greater than zero"),
            Self::InvalidBindAddr { value, reason } => {
                write!(f, "invalid bind address `{value}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}
