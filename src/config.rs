//! Process configuration sourced from environment variables.
//!
//! Both structs are built once at startup and passed down explicitly; nothing
//! in the import pipeline reads the environment on its own.

use crate::error::ConfigError;
use sqlx::postgres::PgConnectOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// PostgreSQL connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub max_connections: u32,
}

impl DbConfig {
    /// Read `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` and
    /// `DB_MAX_CONNECTIONS` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user = non_empty(lookup("DB_USER")).unwrap_or_else(|| "postgres".to_string());
        // PostgreSQL itself falls back to the user name when no database is given.
        let database = non_empty(lookup("DB_NAME")).unwrap_or_else(|| user.clone());

        Ok(Self {
            host: non_empty(lookup("DB_HOST")).unwrap_or_else(|| "localhost".to_string()),
            port: parse_or("DB_PORT", lookup("DB_PORT"), DEFAULT_DB_PORT)?,
            password: non_empty(lookup("DB_PASSWORD")),
            max_connections: parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), 10)?,
            user,
            database,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

/// HTTP listener and request-handling settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub import_timeout: Option<Duration>,
    pub rows_per_statement: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs: Option<u64> = match non_empty(lookup("IMPORT_TIMEOUT_SECS")) {
            Some(raw) => Some(parse_value("IMPORT_TIMEOUT_SECS", raw)?),
            None => None,
        };

        let rows_per_statement: usize = parse_or(
            "IMPORT_ROWS_PER_STATEMENT",
            lookup("IMPORT_ROWS_PER_STATEMENT"),
            1,
        )?;
        if rows_per_statement == 0 {
            return Err(ConfigError::InvalidValue {
                key: "IMPORT_ROWS_PER_STATEMENT",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            bind_host: non_empty(lookup("BIND_HOST")).unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", lookup("PORT"), DEFAULT_HTTP_PORT)?,
            upload_dir: non_empty(lookup("UPLOAD_DIR"))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                lookup("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            import_timeout: timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs),
            rows_per_statement,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(raw) {
        Some(raw) => parse_value(key, raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
        value: raw,
    })
}
