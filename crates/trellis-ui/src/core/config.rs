//! Build-time application configuration.
//!
//! # Design
//! - Values come from the build environment (`option_env!`) because the wasm bundle has no
//!   process environment at runtime.
//! - Blank values count as unset so `TRELLIS_API_BASE_URL=` falls back to the default.
//! - [`AppConfig::from_lookup`] keeps parsing testable without touching the real env.

use std::time::Duration;
use trellis_telemetry::{Environment, ErrorTrackingConfig, LogFormat};

/// Default API base URL (same-origin proxy path).
pub const DEFAULT_API_BASE_URL: &str = "/api";
/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Default tracing level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolved application configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL prefixed to relative API paths.
    pub api_base_url: String,
    /// Deadline applied to every request unless overridden per call.
    pub request_timeout: Duration,
    /// Build environment.
    pub environment: Environment,
    /// Error-tracking DSN, when tracking is enabled.
    pub error_tracking_dsn: Option<String>,
    /// Tracing level directive.
    pub log_level: String,
    /// Log output format; inferred from the build profile unless set.
    pub log_format: LogFormat,
    /// Deliver error-tracking events from development builds.
    pub track_in_development: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            environment: Environment::infer(),
            error_tracking_dsn: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::infer(),
            track_in_development: false,
        }
    }
}

impl AppConfig {
    /// Configuration baked in at compile time.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| match key {
            "TRELLIS_API_BASE_URL" => option_env!("TRELLIS_API_BASE_URL"),
            "TRELLIS_API_TIMEOUT_MS" => option_env!("TRELLIS_API_TIMEOUT_MS"),
            "TRELLIS_ENV" => option_env!("TRELLIS_ENV"),
            "TRELLIS_SENTRY_DSN" => option_env!("TRELLIS_SENTRY_DSN"),
            "TRELLIS_LOG_LEVEL" => option_env!("TRELLIS_LOG_LEVEL"),
            "TRELLIS_LOG_FORMAT" => option_env!("TRELLIS_LOG_FORMAT"),
            "TRELLIS_TRACK_IN_DEV" => option_env!("TRELLIS_TRACK_IN_DEV"),
            _ => None,
        })
    }

    /// Build configuration from an arbitrary lookup.
    #[must_use]
    pub fn from_lookup<'a>(lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();
        let request_timeout = match read("TRELLIS_API_TIMEOUT_MS").map(str::parse::<u64>) {
            Some(Ok(millis)) if millis > 0 => Duration::from_millis(millis),
            Some(_) => {
                tracing::warn!("ignoring invalid TRELLIS_API_TIMEOUT_MS");
                defaults.request_timeout
            }
            None => defaults.request_timeout,
        };
        Self {
            api_base_url: read("TRELLIS_API_BASE_URL")
                .map_or(defaults.api_base_url, ToString::to_string),
            request_timeout,
            environment: read("TRELLIS_ENV").map_or(defaults.environment, Environment::from_name),
            error_tracking_dsn: read("TRELLIS_SENTRY_DSN").map(ToString::to_string),
            log_level: read("TRELLIS_LOG_LEVEL").map_or(defaults.log_level, ToString::to_string),
            log_format: read("TRELLIS_LOG_FORMAT").map_or(defaults.log_format, LogFormat::from_name),
            track_in_development: read("TRELLIS_TRACK_IN_DEV").is_some_and(|value| {
                matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
            }),
        }
    }

    /// Error-tracking settings derived from this configuration.
    #[must_use]
    pub fn error_tracking(&self) -> ErrorTrackingConfig {
        ErrorTrackingConfig::new(self.error_tracking_dsn.clone(), self.environment)
            .with_send_in_development(self.track_in_development)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&'static str, &'static str)]) -> AppConfig {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        AppConfig::from_lookup(|key| map.get(key).copied())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_base_url, "/api");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!config.error_tracking().enabled());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            ("TRELLIS_API_BASE_URL", "https://api.example.com/v1"),
            ("TRELLIS_API_TIMEOUT_MS", "2500"),
            ("TRELLIS_ENV", "production"),
            ("TRELLIS_SENTRY_DSN", "https://key@example.invalid/7"),
            ("TRELLIS_LOG_LEVEL", "debug"),
            ("TRELLIS_LOG_FORMAT", "json"),
        ]);
        assert_eq!(config.api_base_url, "https://api.example.com/v1");
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.environment, Environment::Production);
        assert!(config.error_tracking().enabled());
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.error_tracking().send_in_development);
    }

    #[test]
    fn development_tracking_is_opt_in() {
        let config = config_from(&[
            ("TRELLIS_ENV", "development"),
            ("TRELLIS_TRACK_IN_DEV", "TRUE"),
        ]);
        assert!(config.track_in_development);
        assert!(config.error_tracking().send_in_development);

        let off = config_from(&[("TRELLIS_TRACK_IN_DEV", "no")]);
        assert!(!off.error_tracking().send_in_development);
    }

    #[test]
    fn blank_and_invalid_values_fall_back() {
        let config = config_from(&[
            ("TRELLIS_API_BASE_URL", "   "),
            ("TRELLIS_API_TIMEOUT_MS", "soon"),
            ("TRELLIS_SENTRY_DSN", ""),
            ("TRELLIS_LOG_FORMAT", "xml"),
        ]);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.error_tracking_dsn, None);
        assert_eq!(config.log_format, LogFormat::infer());

        let zero = config_from(&[("TRELLIS_API_TIMEOUT_MS", "0")]);
        assert_eq!(zero.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }
}
