//! API client configuration.
//!
//! Resolved once at startup and passed into the fetcher; nothing in the crate reads the process
//! environment after that.

use crate::traits::ConfigError;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Authoritative base URL variable.
pub const API_URL_VAR: &str = "VACCIPROFILE_API_URL";
/// Legacy base URL variable, only consulted when [`API_URL_VAR`] is unset.
pub const PUBLIC_API_URL_VAR: &str = "VACCIPROFILE_PUBLIC_API_URL";
pub const TIMEOUT_VAR: &str = "VACCIPROFILE_HTTP_TIMEOUT_SECS";
pub const CACHE_TTL_VAR: &str = "VACCIPROFILE_CACHE_TTL_SECS";
pub const CONCURRENCY_VAR: &str = "VACCIPROFILE_MAX_CONCURRENT_FETCHES";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: Url,
    timeout: Duration,
    cache_ttl: Duration,
    max_concurrent_fetches: usize,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_concurrent_fetches: DEFAULT_CONCURRENCY,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Sets how many collection fetches may be in flight at once (minimum 1).
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }

    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let primary = non_empty(API_URL_VAR);
        let legacy = non_empty(PUBLIC_API_URL_VAR);
        let base_url = match (primary, legacy) {
            (Some(primary), Some(legacy)) => {
                if primary.trim_end_matches('/') != legacy.trim_end_matches('/') {
                    warn!(
                        primary = %primary,
                        legacy = %legacy,
                        "{} and {} disagree, using {}",
                        API_URL_VAR,
                        PUBLIC_API_URL_VAR,
                        API_URL_VAR
                    );
                }
                primary
            }
            (Some(primary), None) => primary,
            (None, Some(legacy)) => legacy,
            (None, None) => DEFAULT_BASE_URL.to_string(),
        };

        let mut config = Self::new(&base_url)?;
        if let Some(secs) = non_empty(TIMEOUT_VAR) {
            config.timeout = Duration::from_secs(parse_number(TIMEOUT_VAR, &secs)?);
        }
        if let Some(secs) = non_empty(CACHE_TTL_VAR) {
            config.cache_ttl = Duration::from_secs(parse_number(CACHE_TTL_VAR, &secs)?);
        }
        if let Some(limit) = non_empty(CONCURRENCY_VAR) {
            config = config.with_concurrency(parse_number(CONCURRENCY_VAR, &limit)? as usize);
        }
        Ok(config)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_concurrent_fetches: DEFAULT_CONCURRENCY,
        }
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    // A trailing slash keeps `Url::join` from dropping the last path segment.
    let mut normalized = value.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|source| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        source,
    })
}

fn parse_number(name: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            name: name.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:8080/");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.max_concurrent_fetches(), 4);
    }

    #[test]
    fn test_primary_variable_wins_over_legacy() {
        let config = ApiConfig::from_lookup(lookup(&[
            (API_URL_VAR, "https://api.example.org"),
            (PUBLIC_API_URL_VAR, "https://legacy.example.org"),
        ]))
        .unwrap();
        assert_eq!(config.base_url().as_str(), "https://api.example.org/");
    }

    #[test]
    fn test_legacy_variable_used_when_primary_unset() {
        let config = ApiConfig::from_lookup(lookup(&[
            (API_URL_VAR, "  "),
            (PUBLIC_API_URL_VAR, "https://legacy.example.org/v1"),
        ]))
        .unwrap();
        assert_eq!(config.base_url().as_str(), "https://legacy.example.org/v1/");
    }

    #[test]
    fn test_numeric_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            (TIMEOUT_VAR, "5"),
            (CACHE_TTL_VAR, "0"),
            (CONCURRENCY_VAR, "0"),
        ]))
        .unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.cache_ttl(), Duration::ZERO);
        assert_eq!(config.max_concurrent_fetches(), 1);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "soon")])),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }
}
