//! Server configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! Loaded once in `main` (after `.env` via dotenvy) and shared read-only
//! through `AppState`. Postgres settings follow the libpq `PG*` variable
//! names so the same environment drives both sqlx and ogr2ogr.

use std::path::PathBuf;

use sqlx::postgres::PgConnectOptions;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PG_PORT: u16 = 5432;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} is not a port number")]
    InvalidPort { var: &'static str, value: String },
}

/// Connection parameters for Postgres/PostGIS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl PgSettings {
    #[must_use]
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }

    /// libpq conninfo string, as ogr2ogr expects after the `PG:` prefix.
    #[must_use]
    pub fn conninfo(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            conninfo_value(&self.host),
            self.port,
            conninfo_value(&self.database),
            conninfo_value(&self.user),
            conninfo_value(&self.password),
        )
    }
}

/// Quote a conninfo value when it is empty or contains spaces, quotes, or
/// backslashes.
fn conninfo_value(raw: &str) -> String {
    let needs_quotes = raw.is_empty() || raw.chars().any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if !needs_quotes {
        return raw.to_owned();
    }
    let escaped = raw.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Full connection URL; takes precedence over `pg` when set.
    pub database_url: Option<String>,
    pub pg: PgSettings,
    pub db_max_connections: u32,
    pub bind_addr: String,
    pub port: u16,
    /// Directory served at `/` (the map page and its assets).
    pub static_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub export_dir: PathBuf,
    pub ogr2ogr_bin: String,
    pub zip_bin: String,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Build config from the process environment.
    ///
    /// Optional (defaults in parentheses):
    /// - `DATABASE_URL`, else `PGHOST` (localhost), `PGPORT` (5432),
    ///   `PGDATABASE` (postgres), `PGUSER` (postgres), `PGPASSWORD` (empty)
    /// - `DB_MAX_CONNECTIONS` (10)
    /// - `BIND_ADDR` (127.0.0.1), `PORT` (8000)
    /// - `STATIC_DIR` (static), `UPLOAD_DIR` (static/uploads), `EXPORT_DIR` (data)
    /// - `OGR2OGR_BIN` (ogr2ogr), `ZIP_BIN` (zip)
    /// - `MAX_UPLOAD_MB` (50)
    ///
    /// # Errors
    ///
    /// Returns `InvalidPort` when `PORT` or `PGPORT` is not a valid port.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPort` when `PORT` or `PGPORT` is not a valid port.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let pg = PgSettings {
            host: var("PGHOST", "localhost"),
            port: parse_port(&lookup, "PGPORT", DEFAULT_PG_PORT)?,
            database: var("PGDATABASE", "postgres"),
            user: var("PGUSER", "postgres"),
            password: var("PGPASSWORD", ""),
        };

        let max_upload_mb = lookup("MAX_UPLOAD_MB")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            pg,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|max| *max != 0)
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            bind_addr: var("BIND_ADDR", DEFAULT_BIND_ADDR),
            port: parse_port(&lookup, "PORT", DEFAULT_PORT)?,
            static_dir: PathBuf::from(var("STATIC_DIR", "static")),
            upload_dir: PathBuf::from(var("UPLOAD_DIR", "static/uploads")),
            export_dir: PathBuf::from(var("EXPORT_DIR", "data")),
            ogr2ogr_bin: var("OGR2OGR_BIN", "ogr2ogr"),
            zip_bin: var("ZIP_BIN", "zip"),
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
        })
    }

    /// `PG:` datasource string for ogr2ogr.
    #[must_use]
    pub fn ogr_datasource(&self) -> String {
        match &self.database_url {
            Some(url) => format!("PG:{url}"),
            None => format!("PG:{}", self.pg.conninfo()),
        }
    }

    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_port(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: u16) -> Result<u16, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .ok_or(ConfigError::InvalidPort { var, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
