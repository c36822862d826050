//! # Client Configuration
//!
//! Transport-level settings loaded from environment variables.
//!
//! The project id and the TTL are deliberately absent: the façade takes them
//! as explicit parameters on every call, and only the CLI reads them from the
//! environment.

use reqwest::Url;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

use crate::constants::{env, DEFAULT_PAGE_SIZE, DEFAULT_SECRET_MANAGER_ENDPOINT, MAX_PAGE_SIZE};

/// Errors raised while loading or validating [`ClientConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Plain HTTP is only allowed towards loopback hosts (emulators, mocks)
    #[error("refusing insecure endpoint {0}: use https or a loopback address")]
    InsecureEndpoint(String),
}

/// Client configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the Secret Manager REST API, without the `/v1` suffix
    pub endpoint: String,
    /// Secrets requested per listing page
    pub page_size: u32,
    /// Optional timeout applied by the HTTP transport to each request
    /// The façade itself never enforces one
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SECRET_MANAGER_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable or unsafe value
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable or unsafe value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(env::ENDPOINT).filter(|v| !v.is_empty()) {
            config.endpoint = endpoint.trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup(env::PAGE_SIZE) {
            config.page_size = raw.parse().map_err(|e| ConfigError::InvalidValue {
                var: env::PAGE_SIZE,
                value: raw.clone(),
                reason: format!("{e}"),
            })?;
        }

        if let Some(raw) = lookup(env::REQUEST_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|e| ConfigError::InvalidValue {
                var: env::REQUEST_TIMEOUT_SECS,
                value: raw.clone(),
                reason: format!("{e}"),
            })?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Point the client at another endpoint (emulator, mock server)
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Check the configuration for values the backend would reject or that are unsafe
    ///
    /// # Errors
    /// Returns an error describing the first offending setting
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                var: env::PAGE_SIZE,
                value: self.page_size.to_string(),
                reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }

        let url = Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidValue {
            var: env::ENDPOINT,
            value: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "https" => Ok(()),
            "http" if is_loopback(&url) => Ok(()),
            "http" => Err(ConfigError::InsecureEndpoint(self.endpoint.clone())),
            other => Err(ConfigError::InvalidValue {
                var: env::ENDPOINT,
                value: self.endpoint.clone(),
                reason: format!("unsupported scheme {other}"),
            }),
        }
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.endpoint, "https://secretmanager.googleapis.com");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SECRET_MANAGER_ENDPOINT", "http://127.0.0.1:1234/"),
            ("KNOCK_PAGE_SIZE", "2"),
            ("KNOCK_REQUEST_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:1234");
        assert_eq!(config.page_size, 2);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_rejects_unparsable_values() {
        let err = ClientConfig::from_lookup(lookup(&[("KNOCK_PAGE_SIZE", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                var: "KNOCK_PAGE_SIZE",
                ..
            }
        ));

        let err = ClientConfig::from_lookup(lookup(&[("KNOCK_PAGE_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_plain_http_only_for_loopback() {
        for ok in [
            "http://localhost:8080",
            "http://127.0.0.1:9000",
            "http://[::1]:9000",
            "https://secretmanager.googleapis.com",
        ] {
            assert!(
                ClientConfig::default().with_endpoint(ok).validate().is_ok(),
                "{ok} should be accepted"
            );
        }

        let err = ClientConfig::default()
            .with_endpoint("http://secretmanager.googleapis.com")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureEndpoint(_)));

        let err = ClientConfig::default()
            .with_endpoint("ftp://example.com")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
