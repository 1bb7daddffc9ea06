use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub pool_max_connections: u32,
    pub query_logging: bool,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys take the defaults,
    /// set-but-invalid keys are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let pool_max_connections = match lookup("BOARD_DATABASE_POOL_MAX") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("BOARD_DATABASE_POOL_MAX must be a positive integer, got '{}'", v))?,
            None => defaults.pool_max_connections,
        };

        let query_logging = match lookup("BOARD_DATABASE_QUERY_LOGGING") {
            Some(v) => parse_bool(&v)
                .with_context(|| format!("BOARD_DATABASE_QUERY_LOGGING must be true or false, got '{}'", v))?,
            None => defaults.query_logging,
        };

        Ok(Self {
            database_url: lookup("BOARD_DATABASE_URL").unwrap_or(defaults.database_url),
            pool_max_connections,
            query_logging,
            log_level: lookup("BOARD_LOGGING_LEVEL")
                .map(|v| v.trim().to_lowercase())
                .unwrap_or(defaults.log_level),
        })
    }

    /// Tracing filter directives derived from the config.
    pub fn log_directives(&self, debug: bool) -> String {
        let mut directives = vec![self.log_level.clone()];
        if debug {
            directives.push("task_board=debug".into());
        }
        directives.push(if self.query_logging { "sqlx=debug" } else { "sqlx=warn" }.into());
        directives.join(",")
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:board.db".into(),
            pool_max_connections: 5,
            query_logging: false,
            log_level: "warn".into(),
        }
    }
}
