//! Configuration management for the NetBox connection.

use reqwest::Url;
use std::env;

pub const NETBOX_API_URL: &str = "NETBOX_API_URL";
pub const NETBOX_API_TOKEN: &str = "NETBOX_API_TOKEN";
pub const NETBOX_TIMEOUT_SECS: &str = "NETBOX_TIMEOUT_SECS";
pub const NETBOX_VERIFY_TLS: &str = "NETBOX_VERIFY_TLS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// NetBox connection settings.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the NetBox instance, without the `/api` suffix
    pub netbox_url: Url,
    /// API token sent as `Authorization: Token <token>`
    pub token: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Verify the server certificate
    pub verify_tls: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("netbox_url", &self.netbox_url.as_str())
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration, letting explicit values win over the environment.
    pub fn from_env_with(
        netbox_url: Option<String>,
        token: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match key {
            NETBOX_API_URL => netbox_url.clone().or_else(|| env::var(key).ok()),
            NETBOX_API_TOKEN => token.clone().or_else(|| env::var(key).ok()),
            _ => env::var(key).ok(),
        })
    }

    /// Load configuration from an arbitrary key source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let raw_url = present(NETBOX_API_URL).ok_or(ConfigError::MissingUrl)?;
        let netbox_url = Url::parse(raw_url.trim())
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or(ConfigError::InvalidUrl(raw_url))?;

        let token = present(NETBOX_API_TOKEN).ok_or(ConfigError::MissingToken)?;

        let timeout_secs = match present(NETBOX_TIMEOUT_SECS) {
            Some(value) => value
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(value))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let verify_tls = match present(NETBOX_VERIFY_TLS) {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidVerifyTls(value))?,
            None => true,
        };

        Ok(Self {
            netbox_url,
            token: token.trim().to_string(),
            timeout_secs,
            verify_tls,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("NetBox URL must be provided with --netbox-url or NETBOX_API_URL")]
    MissingUrl,

    #[error("NetBox token must be provided with --netbox-token or NETBOX_API_TOKEN")]
    MissingToken,

    #[error("NetBox token contains characters not allowed in a header")]
    InvalidToken,

    #[error("Invalid NetBox URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid NETBOX_TIMEOUT_SECS value: {0}")]
    InvalidTimeout(String),

    #[error("Invalid NETBOX_VERIFY_TLS value: {0}")]
    InvalidVerifyTls(String),
}
