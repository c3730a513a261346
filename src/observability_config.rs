//! # Observability Configuration
//!
//! Environment-specific configuration for logging and metrics export.

use crate::errors::{AppError, AppResult};

/// Observability configuration for different environments
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Environment name (development, staging, production)
    pub environment: String,
    /// Prometheus metrics endpoint port
    pub metrics_port: u16,
    /// Log level for this crate
    pub log_level: String,
    /// Explicit log format override (`pretty` or `json`)
    pub log_format: Option<String>,
    /// Whether to serve the Prometheus endpoint
    pub enable_metrics_export: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            metrics_port: 9090,
            log_level: "info".to_string(),
            log_format: None,
            enable_metrics_export: true,
        }
    }
}

impl ObservabilityConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_port: lookup("METRICS_PORT")
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.metrics_port),
            log_level: lookup("OBSERVABILITY_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT"),
            enable_metrics_export: lookup("ENABLE_METRICS_EXPORT")
                .and_then(|flag| flag.parse().ok())
                .unwrap_or(defaults.enable_metrics_export),
        }
    }

    /// Check if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Pretty logs in development unless LOG_FORMAT says otherwise
    pub fn use_pretty_logs(&self) -> bool {
        match self.log_format.as_deref() {
            Some(format) => format == "pretty",
            None => self.is_development(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> AppResult<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.as_str()) {
            return Err(AppError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                LEVELS.join(", ")
            )));
        }

        if let Some(format) = &self.log_format {
            if format != "pretty" && format != "json" {
                return Err(AppError::Config(format!(
                    "Invalid LOG_FORMAT '{}'. Must be 'pretty' or 'json'",
                    format
                )));
            }
        }

        if self.enable_metrics_export && self.metrics_port == 0 {
            return Err(AppError::Config("Metrics port cannot be 0".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config = ObservabilityConfig::from_lookup(|_| None);
        assert_eq!(config.environment, "development");
        assert_eq!(config.metrics_port, 9090);
        assert!(config.use_pretty_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_logs_json_unless_overridden() {
        let vars: HashMap<&str, &str> = [("ENVIRONMENT", "production")].into_iter().collect();
        let config = ObservabilityConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert!(!config.use_pretty_logs());

        let vars: HashMap<&str, &str> = [("ENVIRONMENT", "production"), ("LOG_FORMAT", "pretty")]
            .into_iter()
            .collect();
        let config = ObservabilityConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert!(config.use_pretty_logs());
    }

    #[test]
    fn test_invalid_log_level() {
        let config = ObservabilityConfig {
            log_level: "verbose".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }
}
