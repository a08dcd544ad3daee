use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::Deserialize;
use std::env;

/// Settings shared by every service: currently just the listening port.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    5000
}

impl Config {
    /// Load from `.env`, an optional `configuration` file and `APP__*`
    /// variables. A bare `PORT` variable takes precedence over all of them.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .set_override_option("port", env::var("PORT").ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Whether the process runs with `ENVIRONMENT=prod`.
pub fn is_production() -> bool {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod"
}

/// Read a required variable. Outside production a default may stand in.
pub fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    get_env_any(&[key], default, is_prod)
}

/// Like [`get_env`], but the first of several alternate names that is set wins.
pub fn get_env_any(keys: &[&str], default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    if let Some(val) = keys.iter().find_map(|key| env::var(key).ok()) {
        return Ok(val);
    }

    let names = keys.join(" or ");
    if is_prod {
        Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required in production but not set",
            names
        )))
    } else if let Some(def) = default {
        Ok(def.to_string())
    } else {
        Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required but not set",
            names
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_set_alternate_wins() {
        unsafe { env::set_var("CORE_TEST_SECOND", "second") };
        let val = get_env_any(&["CORE_TEST_FIRST", "CORE_TEST_SECOND"], None, false).unwrap();
        assert_eq!(val, "second");

        unsafe { env::set_var("CORE_TEST_FIRST", "first") };
        let val = get_env_any(&["CORE_TEST_FIRST", "CORE_TEST_SECOND"], None, false).unwrap();
        assert_eq!(val, "first");
    }

    #[test]
    fn default_applies_outside_production() {
        let val = get_env("CORE_TEST_UNSET_WITH_DEFAULT", Some("fallback"), false).unwrap();
        assert_eq!(val, "fallback");
    }

    #[test]
    fn missing_value_is_an_error_in_production() {
        let err = get_env("CORE_TEST_UNSET_PROD", Some("fallback"), true).unwrap_err();
        assert!(err.to_string().contains("required in production"));
    }

    #[test]
    fn missing_value_without_default_names_every_alternate() {
        let err = get_env_any(&["CORE_TEST_NONE_A", "CORE_TEST_NONE_B"], None, false).unwrap_err();
        assert!(err.to_string().contains("CORE_TEST_NONE_A or CORE_TEST_NONE_B"));
    }
}
