use std::time::Duration;

use quip_core::AppError;

/// Configuration for the database connection pool, read from `QUIP_DB_*`
/// environment variables. Every field has a local-development default.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub ssl: bool,
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5432,
            database: "jokes_db".into(),
            user: "postgres".into(),
            password: "password".into(),
            ssl: false,
            max_connections: 20,
            connect_timeout: Duration::from_secs(2),
            idle_timeout: Duration::from_secs(30),
        }
    }
}

impl DatabaseConfig {
    /// Read configuration from the environment:
    ///
    /// - `QUIP_DB_HOST` (localhost), `QUIP_DB_PORT` (5432)
    /// - `QUIP_DB_NAME` (jokes_db), `QUIP_DB_USER` (postgres), `QUIP_DB_PASSWORD`
    /// - `QUIP_DB_SSL` (false)
    /// - `QUIP_DB_MAX_CONNECTIONS` (20, must be at least 1)
    /// - `QUIP_DB_CONNECT_TIMEOUT_SECS` (2), `QUIP_DB_IDLE_TIMEOUT_SECS` (30)
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let port = parse_var("QUIP_DB_PORT", defaults.port)?;
        let max_connections: u32 = parse_var("QUIP_DB_MAX_CONNECTIONS", defaults.max_connections)?;
        if max_connections == 0 {
            return Err(AppError::Config(
                "QUIP_DB_MAX_CONNECTIONS must be at least 1".into(),
            ));
        }

        let connect_timeout = parse_var(
            "QUIP_DB_CONNECT_TIMEOUT_SECS",
            defaults.connect_timeout.as_secs(),
        )?;
        let idle_timeout =
            parse_var("QUIP_DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout.as_secs())?;

        Ok(Self {
            host: env_or("QUIP_DB_HOST", defaults.host),
            port,
            database: env_or("QUIP_DB_NAME", defaults.database),
            user: env_or("QUIP_DB_USER", defaults.user),
            password: env_or("QUIP_DB_PASSWORD", defaults.password),
            ssl: parse_var("QUIP_DB_SSL", defaults.ssl)?,
            max_connections,
            connect_timeout: Duration::from_secs(connect_timeout),
            idle_timeout: Duration::from_secs(idle_timeout),
        })
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("invalid {name} '{raw}'"))),
    }
}
