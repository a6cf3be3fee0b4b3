//! Process configuration, read once at startup.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use paygate_auth::{DEFAULT_TOKEN_TTL_HOURS, HashCost};
use paygate_observability::LogFormat;

/// The dashboard's dev proxy expects the API on port 5000.
const DEFAULT_PORT: u16 = 5000;

/// Longest accepted session lifetime (30 days).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,

    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub token_ttl: Duration,
    pub log_format: LogFormat,
    pub cors_allow_any: bool,
    pub hash_cost: HashCost,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("jwt_secret", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .field("token_ttl", &self.token_ttl)
            .field("log_format", &self.log_format)
            .field("cors_allow_any", &self.cors_allow_any)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

impl ApiConfig {
    /// Defaults for everything except the secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            log_format: LogFormat::default(),
            cors_allow_any: true,
            hash_cost: HashCost::default(),
        }
    }

    pub fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let mut config = Self::new(secret);

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = parse("BIND_ADDR", &addr)?;
        }

        if let Some(hours) = lookup("TOKEN_TTL_HOURS") {
            let hours: i64 = parse("TOKEN_TTL_HOURS", &hours)?;
            if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
                return Err(invalid(
                    "TOKEN_TTL_HOURS",
                    format!("must be between 1 and {MAX_TOKEN_TTL_HOURS}"),
                ));
            }
            config.token_ttl = Duration::try_hours(hours)
                .ok_or_else(|| invalid("TOKEN_TTL_HOURS", "out of range"))?;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = format
                .parse()
                .map_err(|e: String| invalid("LOG_FORMAT", e))?;
        }

        if let Some(cors) = lookup("CORS_ALLOW_ANY") {
            config.cors_allow_any = parse("CORS_ALLOW_ANY", &cors)?;
        }

        if let Some(kib) = lookup("PASSWORD_HASH_MEMORY_KIB") {
            config.hash_cost.memory_kib = parse("PASSWORD_HASH_MEMORY_KIB", &kib)?;
        }

        if let Some(iterations) = lookup("PASSWORD_HASH_ITERATIONS") {
            config.hash_cost.iterations = parse("PASSWORD_HASH_ITERATIONS", &iterations)?;
        }

        Ok(config)
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| invalid(key, e.to_string()))
}

fn invalid(key: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_secret_is_a_hard_failure() {
        assert_eq!(
            ApiConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingSecret
        );
        assert_eq!(
            ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "   ")])).unwrap_err(),
            ConfigError::MissingSecret
        );
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.bind_addr, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(config.token_ttl, Duration::hours(24));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.cors_allow_any);
        assert_eq!(config.hash_cost, HashCost::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("TOKEN_TTL_HOURS", "2"),
            ("LOG_FORMAT", "pretty"),
            ("CORS_ALLOW_ANY", "false"),
            ("PASSWORD_HASH_MEMORY_KIB", "4096"),
            ("PASSWORD_HASH_ITERATIONS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.token_ttl, Duration::hours(2));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(!config.cors_allow_any);
        assert_eq!(config.hash_cost.memory_kib, 4096);
        assert_eq!(config.hash_cost.iterations, 3);
    }

    #[test]
    fn bad_values_name_the_key() {
        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("TOKEN_TTL_HOURS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TOKEN_TTL_HOURS", .. }));

        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("BIND_ADDR", "nowhere")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BIND_ADDR", .. }));
    }

    #[test]
    fn token_ttl_is_bounded() {
        for hours in ["0", "-3", "721", "3000000000", "9223372036854775807"] {
            let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("TOKEN_TTL_HOURS", hours)]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "TOKEN_TTL_HOURS", .. }),
                "{hours} was accepted"
            );
        }

        let config = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("TOKEN_TTL_HOURS", "720")])).unwrap();
        assert_eq!(config.token_ttl, Duration::hours(MAX_TOKEN_TTL_HOURS));
    }

    #[test]
    fn debug_redacts_secret() {
        let config = ApiConfig::new("super-secret-value");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }
}
