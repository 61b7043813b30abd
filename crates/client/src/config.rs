//! Connection settings, read from the environment.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::ClientError;

pub const API_URL_VAR: &str = "DOCFORGE_API_URL";
pub const API_TOKEN_VAR: &str = "DOCFORGE_API_TOKEN";
pub const CONNECT_TIMEOUT_VAR: &str = "DOCFORGE_CONNECT_TIMEOUT_SECS";
pub const REQUEST_TIMEOUT_VAR: &str = "DOCFORGE_REQUEST_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// HTTP client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend API, without trailing slash.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        self
    }

    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup(API_URL_VAR).unwrap_or_else(|| {
            warn!("{API_URL_VAR} not set; using {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "{API_URL_VAR} must be an http(s) URL (got {base_url:?})"
            )));
        }

        let connect_secs = read_number(&lookup, CONNECT_TIMEOUT_VAR, defaults.connect_timeout.as_secs())?;
        let request_secs = read_number(&lookup, REQUEST_TIMEOUT_VAR, defaults.request_timeout.as_secs())?;

        let mut config = Self {
            connect_timeout: Duration::from_secs(connect_secs),
            request_timeout: Duration::from_secs(request_secs),
            ..defaults
        }
        .with_base_url(base_url);

        if let Some(token) = lookup(API_TOKEN_VAR) {
            config = config.with_token(token);
        }

        Ok(config)
    }
}

/// Read a numeric variable, falling back to `default` when unset or blank.
pub fn read_number<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ClientError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| ClientError::Config(format!("{key}: {e} (got {raw:?})"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ClientConfig, ClientError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = load(&[
            (API_URL_VAR, "https://erp.example.org/api/"),
            (API_TOKEN_VAR, "secret"),
            (CONNECT_TIMEOUT_VAR, "2"),
            (REQUEST_TIMEOUT_VAR, " 90 "),
        ])
        .unwrap();

        assert_eq!(config.base_url, "https://erp.example.org/api");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(90));
    }

    #[test]
    fn blank_token_is_ignored() {
        let config = load(&[(API_TOKEN_VAR, "  ")]).unwrap();
        assert_eq!(config.token, None);
    }

    #[test]
    fn malformed_number_is_a_config_error() {
        let err = load(&[(REQUEST_TIMEOUT_VAR, "soon")]).unwrap_err();
        assert!(matches!(err, ClientError::Config(msg) if msg.contains(REQUEST_TIMEOUT_VAR)));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = load(&[(API_URL_VAR, "ftp://x")]).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
