// Application configuration loaded once at startup

use std::time::Duration;

use crate::auth::password::HashCost;

/// Errors raised while building the configuration.
/// Any of these aborts startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Longest accepted reset-link lifetime (one day)
pub const MAX_RESET_TOKEN_TTL_MINUTES: i64 = 1440;

/// Which credential/ticket store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Outbound SMTP account used for reset-link emails
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

/// Immutable application configuration
///
/// Built once in `main` and shared behind an `Arc`. Business logic never reads
/// the process environment directly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub smtp: Option<SmtpConfig>,
    pub frontend_url: String,
    pub host: String,
    pub port: u16,
    pub reset_token_ttl_minutes: i64,
    pub hash_cost: HashCost,
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as missing
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let storage = match get("STORAGE_BACKEND").as_deref() {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    reason: format!("expected 'postgres' or 'memory', got '{}'", other),
                })
            }
        };

        let database_url = get("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let tmdb_api_key = get("TMDB_API_KEY").ok_or(ConfigError::Missing("TMDB_API_KEY"))?;
        let tmdb_base_url = get("TMDB_BASE_URL")
            .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string())
            .trim_end_matches('/')
            .to_string();

        let smtp = match (get("EMAIL_USER"), get("EMAIL_PASS")) {
            (Some(username), Some(password)) => Some(SmtpConfig {
                host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                port: parse_or(&get, "SMTP_PORT", 587)?,
                username,
                password,
                timeout: Duration::from_secs(parse_or(&get, "SMTP_TIMEOUT_SECS", 10)?),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("EMAIL_PASS")),
            (None, Some(_)) => return Err(ConfigError::Missing("EMAIL_USER")),
        };

        let frontend_url = get("FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let reset_token_ttl_minutes: i64 = parse_or(&get, "RESET_TOKEN_TTL_MINUTES", 15)?;
        if !(1..=MAX_RESET_TOKEN_TTL_MINUTES).contains(&reset_token_ttl_minutes) {
            return Err(ConfigError::Invalid {
                key: "RESET_TOKEN_TTL_MINUTES",
                reason: format!("must be between 1 and {}", MAX_RESET_TOKEN_TTL_MINUTES),
            });
        }

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            memory_kib: parse_or(&get, "ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&get, "ARGON2_ITERATIONS", defaults.iterations)?,
        };

        Ok(Self {
            jwt_secret,
            storage,
            database_url,
            tmdb_api_key,
            tmdb_base_url,
            smtp,
            frontend_url,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 5000)?,
            reset_token_ttl_minutes,
            hash_cost,
        })
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
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
        move |key| map.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("JWT_SECRET", "s3cret"),
        ("DATABASE_URL", "postgresql://localhost/filmatik"),
        ("TMDB_API_KEY", "key"),
    ];

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AppConfig::from_lookup(lookup(MINIMAL)).unwrap();

        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.port, 5000);
        assert_eq!(config.frontend_url, "http://localhost:3000");
        assert_eq!(config.reset_token_ttl_minutes, 15);
        assert_eq!(config.tmdb_base_url, "https://api.themoviedb.org/3");
        assert!(config.smtp.is_none());
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn test_missing_jwt_secret_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://localhost/filmatik"),
            ("TMDB_API_KEY", "key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_blank_jwt_secret_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "   "),
            ("DATABASE_URL", "postgresql://localhost/filmatik"),
            ("TMDB_API_KEY", "key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_database_url_required_for_postgres_only() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("TMDB_API_KEY", "k")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("TMDB_API_KEY", "k"),
            ("STORAGE_BACKEND", "memory"),
        ]))
        .unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_missing_tmdb_key_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("DATABASE_URL", "postgresql://localhost/filmatik"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TMDB_API_KEY")));
    }

    #[test]
    fn test_smtp_requires_both_credentials() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("EMAIL_USER", "filmatik@example.com"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("EMAIL_PASS")));

        pairs.push(("EMAIL_PASS", "app-password"));
        pairs.push(("SMTP_PORT", "2525"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.gmail.com");
        assert_eq!(smtp.port, 2525);
        assert_eq!(smtp.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let mut pairs = MINIMAL.to_vec();
        pairs.push(("RESET_TOKEN_TTL_MINUTES", "0"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RESET_TOKEN_TTL_MINUTES", .. }));
    }

    #[test]
    fn test_reset_ttl_upper_bound() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("RESET_TOKEN_TTL_MINUTES", "1440"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.reset_token_ttl_minutes, MAX_RESET_TOKEN_TTL_MINUTES);

        for too_long in ["1441", "9223372036854775807"] {
            let mut pairs = MINIMAL.to_vec();
            pairs.push(("RESET_TOKEN_TTL_MINUTES", too_long));
            let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "RESET_TOKEN_TTL_MINUTES", .. }));
        }
    }

    #[test]
    fn test_unknown_storage_backend_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("STORAGE_BACKEND", "mongo"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STORAGE_BACKEND", .. }));
    }

    #[test]
    fn test_trailing_slashes_trimmed() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("FRONTEND_URL", "https://filmatik.app/"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.frontend_url, "https://filmatik.app");
    }
}
