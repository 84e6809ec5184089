//! Application configuration loaded from environment variables.

use serde::Deserialize;

use crate::error::StartupError;

/// Environment variables that must be set for the service to start.
pub const REQUIRED_ENV_VARS: [&str; 11] = [
    "ENVIRONMENT",
    "LOG_LEVEL",
    "API_HOST",
    "API_PORT",
    "SERVICE_NAME",
    "MODEL_TYPE",
    "CACHE_TTL",
    "METRICS_ENABLED",
    "HEALTH_CHECK_INTERVAL",
    "REQUEST_TIMEOUT",
    "MAX_CONCURRENT_REQUESTS",
];

/// Application configuration loaded from environment variables.
///
/// Built once at startup and never mutated afterwards; handlers see it
/// through a shared reference in the application state.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Application ===
    /// Environment name (development, staging, production).
    pub environment: String,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Debug mode.
    #[serde(default)]
    pub debug: bool,

    // === API Server ===
    /// Host address to bind the HTTP server to.
    pub api_host: String,

    /// Port to bind the HTTP server to.
    pub api_port: u16,

    /// URL prefix for versioned API routes.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    // === Service Identity ===
    /// Service name reported by health and status endpoints.
    pub service_name: String,

    /// Service version reported by health and status endpoints.
    #[serde(default = "default_service_version")]
    pub service_version: String,

    // === Model ===
    /// Prediction model type (reported in status metadata only).
    pub model_type: String,

    /// Cache TTL in seconds. Loaded and surfaced in status metadata;
    /// no cache consumes it.
    pub cache_ttl: u64,

    // === Monitoring ===
    /// Whether Prometheus metrics are enabled (status metadata only;
    /// /metrics is always served).
    pub metrics_enabled: bool,

    /// Health check interval in seconds.
    pub health_check_interval: u64,

    // === Request Handling ===
    /// Request timeout in seconds.
    pub request_timeout: u64,

    /// Max concurrent requests. Loaded and surfaced in status
    /// metadata; no limiter consumes it.
    pub max_concurrent_requests: u32,
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    ///
    /// Fails with the complete list of missing required variables, not
    /// just the first one.
    pub fn load() -> Result<Self, StartupError> {
        dotenvy::dotenv().ok();

        let missing = Self::missing_required_vars();
        if !missing.is_empty() {
            return Err(StartupError::MissingEnv(missing));
        }

        let config: Config = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Names of required environment variables absent from the process
    /// environment.
    pub fn missing_required_vars() -> Vec<String> {
        Self::missing_from(|name| std::env::var_os(name).is_some())
    }

    fn missing_from<F>(is_set: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        REQUIRED_ENV_VARS
            .iter()
            .filter(|name| !is_set(name))
            .map(|name| name.to_string())
            .collect()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.service_name.trim().is_empty() {
            return Err(StartupError::Invalid(
                "SERVICE_NAME must not be empty".to_string(),
            ));
        }

        if !self.api_prefix.starts_with('/') || self.api_prefix.len() < 2 {
            return Err(StartupError::Invalid(
                "API_PREFIX must start with '/' and name at least one path segment".to_string(),
            ));
        }

        if self.api_prefix.ends_with('/') {
            return Err(StartupError::Invalid(
                "API_PREFIX must not end with '/'".to_string(),
            ));
        }

        if self.request_timeout == 0 {
            return Err(StartupError::Invalid(
                "REQUEST_TIMEOUT must be at least 1 second".to_string(),
            ));
        }

        if self.max_concurrent_requests == 0 {
            return Err(StartupError::Invalid(
                "MAX_CONCURRENT_REQUESTS must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_pairs() -> Vec<(String, String)> {
        [
            ("ENVIRONMENT", "test"),
            ("LOG_LEVEL", "info"),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8000"),
            ("SERVICE_NAME", "market-predictor"),
            ("MODEL_TYPE", "dummy"),
            ("CACHE_TTL", "300"),
            ("METRICS_ENABLED", "true"),
            ("HEALTH_CHECK_INTERVAL", "30"),
            ("REQUEST_TIMEOUT", "30"),
            ("MAX_CONCURRENT_REQUESTS", "100"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn default_values_are_sensible() {
        assert_eq!(default_api_prefix(), "/api/v1");
        assert_eq!(default_service_version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn parses_typed_fields_from_env_pairs() {
        let config: Config = envy::from_iter(env_pairs()).unwrap();

        assert_eq!(config.environment, "test");
        assert_eq!(config.api_port, 8000);
        assert_eq!(config.cache_ttl, 300);
        assert!(config.metrics_enabled);
        assert_eq!(config.max_concurrent_requests, 100);
        // Optional variables fall back to defaults.
        assert!(!config.debug);
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.service_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn rejects_non_numeric_port() {
        let mut pairs = env_pairs();
        for (key, value) in &mut pairs {
            if key == "API_PORT" {
                *value = "not-a-port".to_string();
            }
        }

        let result: Result<Config, _> = envy::from_iter(pairs);
        assert!(result.is_err());
    }

    #[test]
    fn missing_vars_empty_when_all_present() {
        let missing = Config::missing_from(|_| true);
        assert!(missing.is_empty());
    }

    #[test]
    fn missing_vars_enumerates_every_absent_name() {
        let missing = Config::missing_from(|_| false);
        assert_eq!(missing.len(), REQUIRED_ENV_VARS.len());
        for name in REQUIRED_ENV_VARS {
            assert!(missing.iter().any(|m| m == name), "missing list lacks {name}");
        }
    }

    #[test]
    fn missing_vars_reports_only_absent_names() {
        let missing = Config::missing_from(|name| name != "API_PORT" && name != "CACHE_TTL");
        assert_eq!(missing, vec!["API_PORT".to_string(), "CACHE_TTL".to_string()]);
    }

    #[test]
    fn validate_rejects_empty_service_name() {
        let mut config: Config = envy::from_iter(env_pairs()).unwrap();
        config.service_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_malformed_api_prefix() {
        let mut config: Config = envy::from_iter(env_pairs()).unwrap();

        config.api_prefix = "api/v1".to_string();
        assert!(config.validate().is_err());

        config.api_prefix = "/".to_string();
        assert!(config.validate().is_err());

        config.api_prefix = "/api/v1/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_config() {
        let config: Config = envy::from_iter(env_pairs()).unwrap();
        assert!(config.validate().is_ok());
    }
}
