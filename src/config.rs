//! Service configuration, read from the environment.
//!
//! Every field has a default so a bare `uponor-api` starts against the
//! factory gateway address.

use std::fmt;

use crate::logger::MessageLogMode;

const DEFAULT_UPONOR_HOST: &str = "192.168.1.100";
const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_FILTER: &str = "uponor_jnap=info,uponor_api=info,tower_http=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Gateway address, `host` or `host:port`.
    pub uponor_host: String,
    pub bind_host: String,
    pub port: u16,
    /// Optional NDJSON log of device exchanges.
    pub message_log: Option<(MessageLogMode, String)>,
    /// Filter directive (`RUST_LOG` syntax).
    pub log_filter: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPort(String),
    InvalidLogMode(String),
    EmptyHost,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort(v) => write!(f, "invalid PORT: {v}"),
            ConfigError::InvalidLogMode(v) => {
                write!(f, "invalid UPONOR_MESSAGE_LOG_MODE: {v} (expected full or compact)")
            }
            ConfigError::EmptyHost => write!(f, "UPONOR_HOST must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for Config {
    fn default() -> Self {
        Self {
            uponor_host: DEFAULT_UPONOR_HOST.to_string(),
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
            message_log: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = lookup("UPONOR_HOST") {
            config.uponor_host = host.trim().to_string();
        }
        if let Some(host) = lookup("UPONOR_BIND_HOST") {
            config.bind_host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(path) = lookup("UPONOR_MESSAGE_LOG") {
            let mode = match lookup("UPONOR_MESSAGE_LOG_MODE") {
                Some(m) => MessageLogMode::from_config_str(&m)
                    .ok_or(ConfigError::InvalidLogMode(m))?,
                None => MessageLogMode::Full,
            };
            config.message_log = Some((mode, path));
        }
        if let Some(filter) = lookup("RUST_LOG") {
            config.log_filter = filter;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort("0".to_string()));
        }
        if self.uponor_host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}
