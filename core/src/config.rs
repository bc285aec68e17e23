//! Client configuration.
//!
//! `ServiceConfig` can be deserialized (missing optional keys take their
//! defaults) or read from `METALIB_*` environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::service::Defaults;

/// Default cache lifetime, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// X-Server endpoint, e.g. `http://metalib.example.edu/X`.
    pub base_url: String,
    #[serde(default)]
    pub requester_ip: Option<String>,
    #[serde(default)]
    pub institute: Option<String>,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

impl ServiceConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            requester_ip: None,
            institute: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            timeout_secs: None,
        }
    }

    /// Read `METALIB_URL` (required), `METALIB_REQUESTER_IP`,
    /// `METALIB_INSTITUTE`, `METALIB_CACHE_TTL` and `METALIB_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get("METALIB_URL").ok_or(ConfigError::Missing("METALIB_URL"))?;
        let cache_ttl_secs = match get("METALIB_CACHE_TTL") {
            Some(raw) => parse_secs("METALIB_CACHE_TTL", raw)?,
            None => DEFAULT_CACHE_TTL_SECS,
        };
        let timeout_secs = get("METALIB_TIMEOUT_SECS")
            .map(|raw| parse_secs("METALIB_TIMEOUT_SECS", raw))
            .transpose()?;

        Ok(Self {
            base_url,
            requester_ip: get("METALIB_REQUESTER_IP"),
            institute: get("METALIB_INSTITUTE"),
            cache_ttl_secs,
            timeout_secs,
        })
    }

    /// Default parameters, present only when both IP and institute are set.
    pub fn defaults(&self) -> Option<Defaults> {
        match (&self.requester_ip, &self.institute) {
            (Some(ip), Some(institute)) => Some(Defaults::new(ip, institute)),
            _ => None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn parse_secs(key: &'static str, raw: String) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value: raw })
}
