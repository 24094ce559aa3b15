use crate::resolver::DEFAULT_API_BASE_URL;
use log::LevelFilter;
use std::{env, net::SocketAddr, str::FromStr};
use thiserror::Error;
use url::Url;

pub const PORT_ENV_VAR: &str = "PORT";
pub const API_BASE_URL_ENV_VAR: &str = "UBR_API_BASE_URL";
pub const LOG_LEVEL_ENV_VAR: &str = "UBR_LOG_LEVEL";

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the PORT environment variable must be a port number, not `{0}`")]
    InvalidPort(String),
    #[error("the UBR_API_BASE_URL environment variable is not a valid URL: `{value}`")]
    InvalidApiBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("the UBR_API_BASE_URL environment variable must be a URL that can have a path appended, not `{0}`")]
    ApiBaseUrlNotABase(String),
    #[error("the UBR_LOG_LEVEL environment variable must be one of off, error, warn, info, debug, or trace, not `{0}`")]
    InvalidLogLevel(String),
}

/// Process-wide settings, resolved once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub api_base_url: Url,
    pub log_level: LevelFilter,
}

impl Config {
    /// Reads the config from the process environment. Unset and empty variables both mean "use
    /// the default".
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v: &String| !v.is_empty());

        let port = match var(PORT_ENV_VAR) {
            Some(p) => u16::from_str(&p).map_err(|_| ConfigError::InvalidPort(p))?,
            None => DEFAULT_PORT,
        };

        let api_base_url = var(API_BASE_URL_ENV_VAR).unwrap_or(DEFAULT_API_BASE_URL.to_string());
        let api_base_url =
            Url::parse(&api_base_url).map_err(|source| ConfigError::InvalidApiBaseUrl {
                value: api_base_url.clone(),
                source,
            })?;
        if api_base_url.cannot_be_a_base() {
            return Err(ConfigError::ApiBaseUrlNotABase(api_base_url.to_string()));
        }

        let log_level = match var(LOG_LEVEL_ENV_VAR) {
            Some(l) => LevelFilter::from_str(&l).map_err(|_| ConfigError::InvalidLogLevel(l))?,
            None => LevelFilter::Info,
        };

        Ok(Self {
            port,
            api_base_url,
            log_level,
        })
    }

    /// The address to listen on. This is every interface on the configured port.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
