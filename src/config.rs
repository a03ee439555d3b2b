use std::env;
use std::path::PathBuf;
use thiserror::Error;
use crate::domain::ExternalId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_address: String,
    pub port: u16,
    /// Command log replayed on startup and rewritten after every change.
    pub commands_file: Option<PathBuf>,
    pub api_keys_file: Option<PathBuf>,
    pub admin_external_ids: Vec<ExternalId>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            commands_file: None,
            api_keys_file: None,
            admin_external_ids: Vec::new(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { name: "PORT", value })?,
            None => defaults.port,
        };

        let admin_external_ids = lookup("ADMIN_EXTERNAL_IDS")
            .map(|ids| {
                ids.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(ExternalId::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Settings {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port,
            commands_file: lookup("COMMANDS_FILE").map(PathBuf::from),
            api_keys_file: lookup("API_KEYS_FILE").map(PathBuf::from),
            admin_external_ids,
        })
    }
}
