//! Process configuration, read from command-line flags.

use std::fmt;
use std::time::Duration;

use clap::{Args, Parser, ValueEnum};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid duration `{input}`: {reason}")]
    InvalidDuration { input: String, reason: &'static str },

    #[error("invalid value for {flag}: {reason}")]
    InvalidValue {
        flag: &'static str,
        reason: &'static str,
    },
}

/// Contacts and groups REST API.
#[derive(Parser, Debug, Clone)]
#[command(name = "contact-service")]
#[command(version)]
pub struct Config {
    /// API server port
    #[arg(long, default_value_t = 4000)]
    pub port: u16,

    /// Environment label
    #[arg(long, value_enum, default_value_t = Environment::Development)]
    pub env: Environment,

    #[command(flatten)]
    pub db: DbConfig,

    /// Storage backend
    #[arg(long, value_enum, default_value_t = StoreKind::Postgres)]
    pub store: StoreKind,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

/// Connection pool settings.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// PostgreSQL DSN
    #[arg(long = "db-dsn", env = "CONTACTS_DB_DSN", default_value = "", hide_env_values = true)]
    pub dsn: String,

    /// PostgreSQL max open connections
    #[arg(long = "db-max-open-conns", default_value_t = 25)]
    pub max_open_conns: usize,

    /// PostgreSQL max idle connections
    #[arg(long = "db-max-idle-conns", default_value_t = 25)]
    pub max_idle_conns: usize,

    /// PostgreSQL max connection idle time (e.g. 15m, 90s, 1h30m; 0 for no limit)
    #[arg(long = "db-max-idle-time", default_value = "15m", value_parser = parse_duration)]
    pub max_idle_time: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Config {
    /// Cross-field checks clap cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store == StoreKind::Postgres {
            self.db.validate()?;
        }
        Ok(())
    }
}

impl DbConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dsn.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                flag: "--db-dsn",
                reason: "a PostgreSQL DSN is required",
            });
        }
        if self.max_open_conns == 0 {
            return Err(ConfigError::InvalidValue {
                flag: "--db-max-open-conns",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            dsn: String::new(),
            max_open_conns: 25,
            max_idle_conns: 25,
            max_idle_time: Duration::from_secs(15 * 60),
        }
    }
}

/// Parse durations like `15m`, `90s`, `250ms` or `1h30m`. A bare `0` is zero.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason| ConfigError::InvalidDuration {
        input: input.to_string(),
        reason,
    };

    let s = input.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(invalid("empty"));
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| invalid("missing unit"))?;
        if digits == 0 {
            return Err(invalid("expected a number"));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| invalid("number out of range"))?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = match &rest[..unit_len] {
            "ms" => Duration::from_millis(1),
            "s" => Duration::from_secs(1),
            "m" => Duration::from_secs(60),
            "h" => Duration::from_secs(60 * 60),
            _ => return Err(invalid("unknown unit, expected ms, s, m or h")),
        };
        rest = &rest[unit_len..];

        let part = u32::try_from(value)
            .ok()
            .and_then(|v| unit.checked_mul(v))
            .ok_or_else(|| invalid("number out of range"))?;
        total = total
            .checked_add(part)
            .ok_or_else(|| invalid("number out of range"))?;
    }
    Ok(total)
}
