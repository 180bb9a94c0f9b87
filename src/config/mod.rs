use config::{Config, Environment};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingJwtSecret,
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiry_days")]
    pub jwt_expiry_days: i64,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_spa_dir")]
    pub spa_dir: String,
    #[serde(default = "default_geo_max_distance")]
    pub geo_default_max_distance_m: f64,
    #[serde(default)]
    pub telemetry_enabled: bool,
    #[serde(default = "default_telemetry_service_name")]
    pub telemetry_service_name: String,
    #[serde(default = "default_telemetry_service_version")]
    pub telemetry_service_version: String,
    #[serde(default = "default_telemetry_environment")]
    pub telemetry_environment: String,
    #[serde(default = "default_telemetry_otlp_endpoint")]
    pub telemetry_otlp_endpoint: String,
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_jwt_expiry_days() -> i64 {
    7
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_spa_dir() -> String {
    "app_public/build/browser".to_string()
}

fn default_geo_max_distance() -> f64 {
    20_000.0
}

fn default_telemetry_service_name() -> String {
    "loc8r".to_string()
}

fn default_telemetry_service_version() -> String {
    "1.0.0".to_string()
}

fn default_telemetry_environment() -> String {
    "production".to_string()
}

fn default_telemetry_otlp_endpoint() -> String {
    "http://localhost:4317".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(Environment::default())
    }

    fn from_source(source: Environment) -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Startup checks; the service refuses to boot without a signing secret.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.jwt_expiry_days <= 0 {
            return Err(ConfigError::Invalid(
                "JWT_EXPIRY_DAYS must be positive".to_string(),
            ));
        }
        if !self.geo_default_max_distance_m.is_finite() || self.geo_default_max_distance_m < 0.0 {
            return Err(ConfigError::Invalid(
                "GEO_DEFAULT_MAX_DISTANCE_M must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().source(Some(map))
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_source(env(&[
            ("DATABASE_URL", "postgres://localhost/loc8r"),
            ("JWT_SECRET", "thisIsSecret"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://localhost/loc8r");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.jwt_expiry_days, 7);
        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.geo_default_max_distance_m, 20_000.0);
        assert!(!config.telemetry_enabled);
        assert_eq!(config.telemetry_service_name, "loc8r");
    }

    #[test]
    fn test_missing_jwt_secret_is_a_startup_error() {
        let result = AppConfig::from_source(env(&[("DATABASE_URL", "postgres://localhost/loc8r")]));
        assert!(matches!(result, Err(ConfigError::MissingJwtSecret)));

        let result = AppConfig::from_source(env(&[
            ("DATABASE_URL", "postgres://localhost/loc8r"),
            ("JWT_SECRET", "   "),
        ]));
        assert!(matches!(result, Err(ConfigError::MissingJwtSecret)));
    }

    #[test]
    fn test_missing_database_url_fails_to_load() {
        let result = AppConfig::from_source(env(&[("JWT_SECRET", "thisIsSecret")]));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
