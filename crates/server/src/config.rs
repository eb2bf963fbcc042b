//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `POS_HOST` - Bind address (default: 0.0.0.0)
//! - `POS_PORT` - Listen port (default: 5000)
//! - `POS_BASE_DIR` - Directory relative paths resolve against (default: directory of the server executable)
//! - `POS_DATA_FILE` - JSON document location (default: data.json)
//! - `POS_STATIC_DIR` - Directory holding the front-end page (default: static)
//! - `POS_INDEX_FILE` - Front-end entry page inside `POS_STATIC_DIR` (default: index.html)
//! - `POS_MAX_BODY_BYTES` - Largest accepted save request (default: 16 MiB)
//! - `POS_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! Anchoring to the executable keeps the data file in one place however the
//! server is launched. For `cargo run` from the workspace, set
//! `POS_BASE_DIR=.` and `POS_STATIC_DIR=crates/server/static` (see `.env.example`).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATA_FILE: &str = "data.json";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_INDEX_FILE: &str = "index.html";
const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Cannot determine base directory: {0}")]
    BaseDir(#[from] std::io::Error),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines for local runs.
    #[default]
    Text,
    /// One JSON object per event for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `text` or `json`, got `{other}`")),
        }
    }
}

/// Data server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Absolute path of the persisted JSON document
    pub data_file: PathBuf,
    /// Absolute path of the front-end entry page served at `/`
    pub index_file: PathBuf,
    /// Maximum request body size for saves
    pub max_body_bytes: usize,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Configuration with default network settings and the given file locations.
    #[must_use]
    pub fn new(data_file: impl Into<PathBuf>, index_file: impl Into<PathBuf>) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            data_file: data_file.into(),
            index_file: index_file.into(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed or, without
    /// `POS_BASE_DIR`, the executable's location cannot be read.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_dir = match lookup("POS_BASE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => executable_dir()?,
        };

        let host = parse_or_default(&lookup, "POS_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port = parse_or_default(&lookup, "POS_PORT", DEFAULT_PORT)?;
        let max_body_bytes = parse_or_default(&lookup, "POS_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?;
        let log_format = parse_or_default(&lookup, "POS_LOG_FORMAT", LogFormat::Text)?;

        let data_file = resolve(
            &base_dir,
            &lookup("POS_DATA_FILE").unwrap_or_else(|| DEFAULT_DATA_FILE.to_string()),
        );
        let static_dir = resolve(
            &base_dir,
            &lookup("POS_STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
        );
        let index_file = static_dir
            .join(lookup("POS_INDEX_FILE").unwrap_or_else(|| DEFAULT_INDEX_FILE.to_string()));

        Ok(Self {
            host,
            port,
            data_file,
            index_file,
            max_body_bytes,
            log_format,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable if set, otherwise fall back to `default`.
fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Directory containing the running executable.
fn executable_dir() -> Result<PathBuf, ConfigError> {
    let exe = std::env::current_exe()?;
    Ok(exe.parent().map(Path::to_path_buf).unwrap_or_default())
}

/// Resolve `path` against `base` unless it is already absolute.
fn resolve(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
