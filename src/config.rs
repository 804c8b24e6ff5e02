use std::env;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::auth::Role;
use crate::dispatcher::DEFAULT_REQUEST_TIMEOUT;

pub const API_URL_KEY: &str = "INFINITE_CARGO_API_URL";
pub const REQUEST_TIMEOUT_KEY: &str = "INFINITE_CARGO_REQUEST_TIMEOUT_MS";
pub const ROLE_KEY: &str = "INFINITE_CARGO_ROLE";
pub const TOKEN_KEY: &str = "INFINITE_CARGO_TOKEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: Url,
    pub request_timeout: Duration,
    pub role: Role,
    pub token: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url.as_str())
            .field("request_timeout", &self.request_timeout)
            .field("role", &self.role)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let raw_url = var(API_URL_KEY).ok_or(ConfigError::Missing(API_URL_KEY))?;
        let api_url = Url::parse(raw_url.trim()).map_err(|err| ConfigError::Invalid {
            key: API_URL_KEY,
            reason: format!("{}: {}", raw_url, err),
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: API_URL_KEY,
                reason: format!("{} is not an http(s) URL", raw_url),
            });
        }

        let request_timeout = match var(REQUEST_TIMEOUT_KEY) {
            Some(value) => {
                let millis: u64 = value.trim().parse().map_err(|err| ConfigError::Invalid {
                    key: REQUEST_TIMEOUT_KEY,
                    reason: format!("{}", err),
                })?;
                if millis == 0 {
                    return Err(ConfigError::Invalid {
                        key: REQUEST_TIMEOUT_KEY,
                        reason: "must be greater than zero".into(),
                    });
                }
                Duration::from_millis(millis)
            }
            None => {
                tracing::info!("{} not set, using {:?}", REQUEST_TIMEOUT_KEY, DEFAULT_REQUEST_TIMEOUT);
                DEFAULT_REQUEST_TIMEOUT
            }
        };

        let role = match var(ROLE_KEY) {
            Some(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                key: ROLE_KEY,
                reason,
            })?,
            None => Role::Driver,
        };

        let token = var(TOKEN_KEY);
        if token.is_none() {
            tracing::warn!("{} not set, requests will fail as unauthenticated", TOKEN_KEY);
        }

        Ok(Self {
            api_url,
            request_timeout,
            role,
            token,
        })
    }
}
