//! Client configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. [`StorefrontConfig::from_lookup`] takes any key lookup so tests
//! never touch the process environment.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use storefront_core::{Money, DEFAULT_DELIVERY_FEE, FEATURED_PRODUCT_LIMIT};
use url::Url;

/// Storefront client configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Base URL of the backend-as-a-service project
    pub supabase_url: Url,

    /// Public anon key sent as `apikey` on every request
    pub anon_key: String,

    /// Existing session access token (optional)
    pub access_token: Option<String>,

    /// Existing session refresh token (optional)
    pub refresh_token: Option<String>,

    /// Flat delivery fee added to the summary
    pub delivery_fee: Money,

    /// Per-request timeout
    pub http_timeout: Duration,

    /// Number of featured products on the home feed
    pub featured_limit: usize,
}

impl fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("supabase_url", &self.supabase_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("delivery_fee", &self.delivery_fee)
            .field("http_timeout", &self.http_timeout)
            .field("featured_limit", &self.featured_limit)
            .finish()
    }
}

impl StorefrontConfig {
    /// Creates a config with defaults for everything but the endpoint and key.
    pub fn new(supabase_url: Url, anon_key: impl Into<String>) -> Self {
        StorefrontConfig {
            supabase_url,
            anon_key: anon_key.into(),
            access_token: None,
            refresh_token: None,
            delivery_fee: DEFAULT_DELIVERY_FEE,
            http_timeout: Duration::from_secs(30),
            featured_limit: FEATURED_PRODUCT_LIMIT,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// ## Keys
    /// - `SUPABASE_URL` (required, http/https)
    /// - `SUPABASE_ANON_KEY` (required)
    /// - `STOREFRONT_ACCESS_TOKEN`, `STOREFRONT_REFRESH_TOKEN`
    /// - `STOREFRONT_DELIVERY_FEE` (default 5.99)
    /// - `STOREFRONT_HTTP_TIMEOUT_SECS` (default 30)
    /// - `STOREFRONT_FEATURED_LIMIT` (default 6)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let raw_url = non_empty("SUPABASE_URL")
            .ok_or_else(|| ConfigError::MissingRequired("SUPABASE_URL".to_string()))?;
        let supabase_url = Url::parse(raw_url.trim())
            .map_err(|_| ConfigError::InvalidValue("SUPABASE_URL".to_string()))?;
        if !matches!(supabase_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue("SUPABASE_URL".to_string()));
        }

        let anon_key = non_empty("SUPABASE_ANON_KEY")
            .ok_or_else(|| ConfigError::MissingRequired("SUPABASE_ANON_KEY".to_string()))?;

        let delivery_fee = match non_empty("STOREFRONT_DELIVERY_FEE") {
            Some(raw) => Decimal::from_str(raw.trim())
                .ok()
                .and_then(|fee| Money::from_decimal(fee).ok())
                .filter(|fee| !fee.is_negative())
                .ok_or_else(|| ConfigError::InvalidValue("STOREFRONT_DELIVERY_FEE".to_string()))?,
            None => DEFAULT_DELIVERY_FEE,
        };

        let http_timeout_secs: u64 = non_empty("STOREFRONT_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("STOREFRONT_HTTP_TIMEOUT_SECS".to_string()))?;

        let featured_limit: usize = non_empty("STOREFRONT_FEATURED_LIMIT")
            .unwrap_or_else(|| FEATURED_PRODUCT_LIMIT.to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("STOREFRONT_FEATURED_LIMIT".to_string()))?;

        Ok(StorefrontConfig {
            supabase_url,
            anon_key,
            access_token: non_empty("STOREFRONT_ACCESS_TOKEN"),
            refresh_token: non_empty("STOREFRONT_REFRESH_TOKEN"),
            delivery_fee,
            http_timeout: Duration::from_secs(http_timeout_secs),
            featured_limit,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("SUPABASE_URL", "https://project.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon-key"),
    ];

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.supabase_url.host_str(), Some("project.supabase.co"));
        assert_eq!(config.delivery_fee.cents(), 599);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.featured_limit, 6);
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("STOREFRONT_DELIVERY_FEE", "0"),
            ("STOREFRONT_HTTP_TIMEOUT_SECS", "5"),
            ("STOREFRONT_FEATURED_LIMIT", "12"),
            ("STOREFRONT_ACCESS_TOKEN", "token"),
            ("STOREFRONT_REFRESH_TOKEN", ""),
        ]);

        let config = StorefrontConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.delivery_fee, Money::zero());
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.featured_limit, 12);
        assert_eq!(config.access_token.as_deref(), Some("token"));
        assert!(config.refresh_token.is_none());
    }

    #[test]
    fn test_missing_required() {
        let err = StorefrontConfig::from_lookup(lookup(&[("SUPABASE_ANON_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(key) if key == "SUPABASE_URL"));

        let err = StorefrontConfig::from_lookup(lookup(&[("SUPABASE_URL", "https://x.io")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(key) if key == "SUPABASE_ANON_KEY"));
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("SUPABASE_URL", "not a url"),
            ("SUPABASE_URL", "ftp://files.example.com"),
            ("STOREFRONT_DELIVERY_FEE", "-1"),
            ("STOREFRONT_DELIVERY_FEE", "five"),
            ("STOREFRONT_HTTP_TIMEOUT_SECS", "soon"),
        ] {
            let mut pairs = REQUIRED.to_vec();
            pairs.retain(|(k, _)| *k != key);
            pairs.push((key, value));

            let err = StorefrontConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref k) if k == key), "{key}={value}");
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("STOREFRONT_ACCESS_TOKEN", "secret-token"));
        let config = StorefrontConfig::from_lookup(lookup(&pairs)).unwrap();

        let debug = format!("{config:?}");
        assert!(!debug.contains("anon-key"));
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }
}
