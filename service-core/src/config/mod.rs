use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> String {
    "dev".to_string()
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "prod"
    }
}

/// Read an environment variable, falling back to `default` outside production.
///
/// In production every key is required, defaults are ignored.
pub fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Parse a numeric environment variable, keeping `default` when unset or malformed.
pub fn get_env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_uses_default_outside_prod() {
        let value = get_env("SERVICE_CORE_TEST_UNSET_KEY", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn test_get_env_requires_value_in_prod() {
        let result = get_env("SERVICE_CORE_TEST_UNSET_KEY", Some("fallback"), true);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_get_env_parsed_falls_back() {
        assert_eq!(get_env_parsed("SERVICE_CORE_TEST_UNSET_NUMBER", 42u32), 42);
    }
}
