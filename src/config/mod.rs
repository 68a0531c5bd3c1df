//! Configuration module for the gallery backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Password used when `GALLERY_ADMIN_PASSWORD` is not set.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// Invalid startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the JSON document holding images and comments
    pub db_path: PathBuf,
    /// Directory uploaded files are written to and served from
    pub uploads_dir: PathBuf,
    /// Directory of static client files served as the fallback route
    pub public_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Shared admin secret
    pub admin_password: String,
    /// Idle lifetime of a session
    pub session_ttl: Duration,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("GALLERY_DB_PATH")
            .unwrap_or_else(|| "./data/db.json".to_string())
            .into();

        let uploads_dir = lookup("GALLERY_UPLOADS_DIR")
            .unwrap_or_else(|| "./uploads".to_string())
            .into();

        let public_dir = lookup("GALLERY_PUBLIC_DIR")
            .unwrap_or_else(|| "./public".to_string())
            .into();

        let bind_addr = match (lookup("GALLERY_BIND_ADDR"), lookup("PORT")) {
            (Some(addr), _) => addr,
            (None, Some(port)) => format!("0.0.0.0:{}", port),
            (None, None) => "127.0.0.1:3000".to_string(),
        };
        let bind_addr = bind_addr
            .parse()
            .map_err(|_| invalid("GALLERY_BIND_ADDR", &bind_addr))?;

        let admin_password =
            lookup("GALLERY_ADMIN_PASSWORD").unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());
        if admin_password.trim().is_empty() {
            return Err(ConfigError(
                "GALLERY_ADMIN_PASSWORD must not be empty".to_string(),
            ));
        }

        let session_ttl = parse_number(&lookup, "GALLERY_SESSION_TTL_SECS", 86_400)?;
        let max_upload_bytes = parse_number(&lookup, "GALLERY_MAX_UPLOAD_BYTES", 25 * 1024 * 1024)?;

        let log_level = lookup("GALLERY_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_format = match lookup("GALLERY_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(invalid("GALLERY_LOG_FORMAT", other)),
        };

        Ok(Self {
            db_path,
            uploads_dir,
            public_dir,
            bind_addr,
            admin_password,
            session_ttl: Duration::from_secs(session_ttl),
            max_upload_bytes: max_upload_bytes as usize,
            log_level,
            log_format,
        })
    }

    /// Whether the admin password was left at the built-in default.
    pub fn uses_default_password(&self) -> bool {
        self.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| invalid(key, &raw)),
        None => Ok(default),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError(format!("invalid {} value: {:?}", key, value))
}
