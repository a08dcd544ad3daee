use secrecy::SecretString;
use service_core::config::{self as core_config, get_env, get_env_any, is_production};
use service_core::error::AppError;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;
const DEFAULT_REPORTS_DIR: &str = "reports";

/// Request bodies up to 10 MiB (base64 images inflate by a third).
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Process-wide settings, read once at startup and shared through `AppState`.
#[derive(Debug, Clone)]
pub struct PlantConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub reports: ReportSettings,
    pub limits: LimitSettings,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: SecretString,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Working directory for generated PDFs and decoded images.
    pub dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LimitSettings {
    pub max_body_bytes: usize,
}

impl PlantConfig {
    pub fn load() -> Result<Self, AppError> {
        // Handles .env, APP__* and PORT
        let common_config = core_config::Config::load()?;
        let is_prod = is_production();

        Ok(PlantConfig {
            common: common_config,
            gemini: GeminiSettings {
                api_key: SecretString::new(get_env_any(
                    &["API_KEY", "GEMINI_API_KEY"],
                    Some(""),
                    is_prod,
                )?),
                model: get_env("GEMINI_MODEL", Some(DEFAULT_GEMINI_MODEL), is_prod)?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), false)?,
                timeout: Duration::from_secs(parse_or(
                    "GEMINI_TIMEOUT_SECS",
                    DEFAULT_GEMINI_TIMEOUT_SECS,
                )?),
            },
            reports: ReportSettings {
                dir: PathBuf::from(get_env("REPORTS_DIR", Some(DEFAULT_REPORTS_DIR), false)?),
            },
            limits: LimitSettings {
                max_body_bytes: parse_or("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            },
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr + ToString,
    T::Err: std::fmt::Display,
{
    let raw = get_env(key, Some(&default.to_string()), false)?;
    raw.trim().parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has an invalid value {:?}: {}", key, raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_uses_default_when_unset() {
        let val: u64 = parse_or("PLANT_TEST_UNSET_NUMBER", 42).unwrap();
        assert_eq!(val, 42);
    }

    #[test]
    fn parse_or_rejects_garbage() {
        std::env::set_var("PLANT_TEST_BAD_NUMBER", "ten");
        let err = parse_or::<usize>("PLANT_TEST_BAD_NUMBER", 1).unwrap_err();
        assert!(err.to_string().contains("PLANT_TEST_BAD_NUMBER"));
    }

    #[test]
    fn api_key_is_not_printed() {
        let settings = GeminiSettings {
            api_key: SecretString::new("super-secret".to_string()),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(!format!("{:?}", settings).contains("super-secret"));
    }
}
