use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Neo4j
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub neo4j_database: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,
    pub static_dir: PathBuf,

    // Rate limiting on /api
    pub rate_limit_max: usize,
    pub rate_limit_window_secs: u64,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first
    /// when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let rate_limit_max: usize =
            parsed(&lookup, "RATE_LIMIT_MAX", POSITIVE_INTEGER, 25)?;
        if rate_limit_max == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_MAX",
                expected: POSITIVE_INTEGER,
                value: "0".to_string(),
            });
        }

        Ok(Self {
            neo4j_uri: required("NEO4J_URI")?,
            neo4j_user: required("NEO4J_USER")?,
            neo4j_password: required("NEO4J_PASSWORD")?,
            neo4j_database: lookup("NEO4J_DATABASE").unwrap_or_else(|| "neo4j".to_string()),
            web_host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port: parsed(&lookup, "PORT", "a port number", 3001)?,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            rate_limit_max,
            rate_limit_window_secs: parsed(
                &lookup,
                "RATE_LIMIT_WINDOW_SECS",
                "a number of seconds",
                15 * 60,
            )?,
        })
    }

    /// True for Aura and other TLS endpoints.
    pub fn is_secure_uri(&self) -> bool {
        self.neo4j_uri.contains("databases.neo4j.io")
            || self.neo4j_uri.starts_with("neo4j+s://")
            || self.neo4j_uri.starts_with("bolt+s://")
    }
}

const POSITIVE_INTEGER: &str = "a positive integer";

fn parsed<F, T>(
    lookup: &F,
    key: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            expected,
            value,
        }),
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

    const CREDS: [(&str, &str); 3] = [
        ("NEO4J_URI", "bolt://localhost:7687"),
        ("NEO4J_USER", "neo4j"),
        ("NEO4J_PASSWORD", "secret"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let config = Config::from_lookup(lookup(&CREDS)).unwrap();
        assert_eq!(config.neo4j_database, "neo4j");
        assert_eq!(config.web_port, 3001);
        assert_eq!(config.web_host, "0.0.0.0");
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.rate_limit_max, 25);
        assert_eq!(config.rate_limit_window_secs, 900);
    }

    #[test]
    fn missing_credentials_are_reported_by_name() {
        let err = Config::from_lookup(lookup(&CREDS[..2])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("NEO4J_PASSWORD"));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let mut pairs = CREDS.to_vec();
        pairs[1] = ("NEO4J_USER", "  ");
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("NEO4J_USER"));
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut pairs = CREDS.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        let mut pairs = CREDS.to_vec();
        pairs.push(("RATE_LIMIT_MAX", "0"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RATE_LIMIT_MAX", .. }));
    }

    #[test]
    fn overrides_are_read() {
        let mut pairs = CREDS.to_vec();
        pairs.extend([("NEO4J_DATABASE", "kort"), ("PORT", "8080")]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.neo4j_database, "kort");
        assert_eq!(config.web_port, 8080);
    }

    #[test]
    fn aura_uris_are_secure() {
        let mut pairs = CREDS.to_vec();
        pairs[0] = ("NEO4J_URI", "neo4j+s://abc123.databases.neo4j.io");
        assert!(Config::from_lookup(lookup(&pairs)).unwrap().is_secure_uri());
        assert!(!Config::from_lookup(lookup(&CREDS)).unwrap().is_secure_uri());
    }
}
