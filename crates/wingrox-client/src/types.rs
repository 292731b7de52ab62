use serde::{Deserialize, Serialize};
use wingrox_types::{DEFAULT_ALIAS_PREFIXES, DEFAULT_PORT};

use crate::error::ClientError;

pub const ENV_BASE_URLS: &str = "WINGROX_BASE_URLS";
pub const ENV_ALIAS_PREFIXES: &str = "WINGROX_ALIAS_PREFIXES";
pub const ENV_TIMEOUT_MS: &str = "WINGROX_TIMEOUT_MS";
pub const ENV_STORE_TAG: &str = "WINGROX_STORE_TAG";
pub const ENV_MAX_RETRIES: &str = "WINGROX_MAX_RETRIES";

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Extra runs of the whole fallback after `AllEndpointsFailed`
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
    /// Also retry non-idempotent operations
    pub retry_writes: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 2, base_delay_ms: 200, max_delay_ms: 5_000, jitter: true, retry_writes: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Hosts to try, in priority order
    pub base_urls: Vec<String>,
    /// Alias prefixes to try on every host, in priority order
    pub alias_prefixes: Vec<String>,
    /// Per-candidate timeout
    pub timeout_ms: u64,
    pub retry: RetryConfig,
    /// Declares every base URL to reach the same store. When unset each
    /// host is its own store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_tag: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_urls: vec![format!("http://127.0.0.1:{}", DEFAULT_PORT)],
            alias_prefixes: DEFAULT_ALIAS_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: RetryConfig::default(),
            store_tag: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `WINGROX_*` variables from `env`.
    pub fn from_env_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut config = Self::default();
        if let Some(urls) = env(ENV_BASE_URLS).filter(|v| !v.trim().is_empty()) {
            config.base_urls = split_list(&urls).into_iter().filter(|u| !u.is_empty()).collect();
        }
        if let Some(prefixes) = env(ENV_ALIAS_PREFIXES) {
            config.alias_prefixes = split_list(&prefixes);
        }
        if let Some(timeout) = env(ENV_TIMEOUT_MS).filter(|v| !v.trim().is_empty()) {
            config.timeout_ms = timeout.trim().parse().map_err(|_| {
                ClientError::Config(format!("{} must be an integer, got '{}'", ENV_TIMEOUT_MS, timeout))
            })?;
        }
        if let Some(retries) = env(ENV_MAX_RETRIES).filter(|v| !v.trim().is_empty()) {
            config.retry.max_retries = retries.trim().parse().map_err(|_| {
                ClientError::Config(format!("{} must be an integer, got '{}'", ENV_MAX_RETRIES, retries))
            })?;
        }
        if let Some(tag) = env(ENV_STORE_TAG).filter(|v| !v.trim().is_empty()) {
            config.store_tag = Some(tag.trim().to_string());
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.base_urls.is_empty() {
            return Err(ClientError::Config("at least one base URL is required".to_string()));
        }
        for base in &self.base_urls {
            let parsed = url::Url::parse(base)
                .map_err(|e| ClientError::Config(format!("invalid base URL '{}': {}", base, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ClientError::Config(format!("base URL '{}' must be http(s)", base)));
            }
        }
        if self.alias_prefixes.is_empty() {
            return Err(ClientError::Config("at least one alias prefix is required".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::Config("timeoutMs must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_target_local_server() {
        let config = ClientConfig::from_env_with(env_of(&[])).unwrap();
        assert_eq!(config.base_urls, vec!["http://127.0.0.1:8080"]);
        assert_eq!(config.alias_prefixes, vec!["/api", "", "/emergency"]);
        assert_eq!(config.timeout_ms, 5_000);
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_env_with(env_of(&[
            (ENV_BASE_URLS, "http://a:1, http://b:2"),
            (ENV_TIMEOUT_MS, "750"),
            (ENV_STORE_TAG, "shared"),
        ]))
        .unwrap();
        assert_eq!(config.base_urls, vec!["http://a:1", "http://b:2"]);
        assert_eq!(config.timeout_ms, 750);
        assert_eq!(config.store_tag.as_deref(), Some("shared"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(ClientConfig::from_env_with(env_of(&[(ENV_TIMEOUT_MS, "0")])).is_err());
    }

    #[test]
    fn test_non_http_base_rejected() {
        let config = ClientConfig { base_urls: vec!["ftp://x".into()], ..Default::default() };
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));
    }
}
