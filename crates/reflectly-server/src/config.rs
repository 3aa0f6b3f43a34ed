//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use reflectly_shared::constants::{APP_NAME, DEFAULT_HTTP_PORT, MAX_BODY_SIZE};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:3000`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: `None` (platform data directory, `reflectly.db`).
    pub database_path: Option<PathBuf>,

    /// Bearer token guarding the project administration endpoints.
    /// Env: `ADMIN_TOKEN`
    /// Default: empty (project admin API disabled).
    pub admin_token: Option<String>,

    /// Sustained requests per second allowed per client IP.
    /// Env: `RATE_LIMIT_PER_SEC`
    /// Default: `5.0`
    pub rate_limit_per_sec: f64,

    /// Burst size of the per-IP token bucket.
    /// Env: `RATE_LIMIT_BURST`
    /// Default: `20.0`
    pub rate_limit_burst: f64,

    /// Largest accepted request body in bytes.
    /// Env: `MAX_BODY_BYTES`
    /// Default: 64 KiB
    pub max_body_bytes: usize,

    /// Human-readable name reported by `/info`.
    /// Env: `INSTANCE_NAME`
    /// Default: `"Reflectly"`
    pub instance_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: None,
            admin_token: None,
            rate_limit_per_sec: 5.0,
            rate_limit_burst: 20.0,
            max_body_bytes: MAX_BODY_SIZE,
            instance_name: APP_NAME.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(parsed) => config.http_addr = parsed,
                Err(_) => tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default"),
            }
        }

        if let Some(path) = lookup("DATABASE_PATH").filter(|p| !p.trim().is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(token) = lookup("ADMIN_TOKEN") {
            if !token.is_empty() {
                config.admin_token = Some(token);
            }
        }

        if let Some(rate) = parse_positive(&lookup, "RATE_LIMIT_PER_SEC") {
            config.rate_limit_per_sec = rate;
        }

        if let Some(burst) = parse_positive(&lookup, "RATE_LIMIT_BURST") {
            config.rate_limit_burst = burst;
        }

        if let Some(val) = lookup("MAX_BODY_BYTES") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_body_bytes = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_BODY_BYTES, using default"),
            }
        }

        if let Some(name) = lookup("INSTANCE_NAME") {
            config.instance_name = name;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

fn parse_positive<F>(lookup: &F, key: &str) -> Option<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => {
            tracing::warn!(key, value = %raw, "Invalid rate limit setting, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 3000).into());
        assert!(config.database_path.is_none());
        assert!(config.admin_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("DATABASE_PATH", "/tmp/feedback.db"),
            ("ADMIN_TOKEN", "secret"),
            ("RATE_LIMIT_PER_SEC", "2.5"),
            ("MAX_BODY_BYTES", "1024"),
        ]);
        assert_eq!(config.http_addr, ([127, 0, 0, 1], 9000).into());
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/feedback.db")));
        assert_eq!(config.admin_token.as_deref(), Some("secret"));
        assert_eq!(config.rate_limit_per_sec, 2.5);
        assert_eq!(config.max_body_bytes, 1024);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("HTTP_ADDR", "not an address"),
            ("ADMIN_TOKEN", ""),
            ("RATE_LIMIT_BURST", "-3"),
            ("MAX_BODY_BYTES", "lots"),
        ]);
        let defaults = ServerConfig::default();
        assert_eq!(config.http_addr, defaults.http_addr);
        assert!(config.admin_token.is_none());
        assert_eq!(config.rate_limit_burst, defaults.rate_limit_burst);
        assert_eq!(config.max_body_bytes, defaults.max_body_bytes);
    }
}
