//! Runtime configuration for the OCR provider and the pipeline.
//!
//! Everything can be loaded from environment variables; the CLI exposes
//! the same variables as flags.

use crate::utils::ConfigError;
use crate::validation::IdentityGate;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.ocr.space/parse/image";

/// Settings for the hosted OCR provider.
///
/// `Debug` redacts the API key.
#[derive(Clone)]
pub struct OcrConfig {
    pub endpoint: String,
    pub api_key: String,
    /// Provider language code, e.g. `eng`.
    pub language: String,
    /// Provider OCR engine number.
    pub engine: u8,
    pub timeout: Duration,
    /// Extra attempts after a transient failure. Zero means fail fast.
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl std::fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("language", &self.language)
            .field("engine", &self.engine)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .finish()
    }
}

impl OcrConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
            api_key: api_key.into(),
            language: "eng".to_string(),
            engine: 2,
            timeout: Duration::from_secs(30),
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }

    /// Load from the environment.
    ///
    /// Variables:
    /// - `OCR_API_KEY` (required)
    /// - `OCR_ENDPOINT` (default: `https://api.ocr.space/parse/image`)
    /// - `OCR_LANGUAGE` (default: `eng`)
    /// - `OCR_ENGINE` (default: 2)
    /// - `OCR_TIMEOUT_SECS` (default: 30)
    /// - `OCR_MAX_RETRIES` (default: 0)
    /// - `OCR_RETRY_BACKOFF_MS` (default: 500)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OCR_API_KEY").map_err(|_| ConfigError::Missing("OCR_API_KEY"))?;
        let defaults = Self::new(api_key);

        Ok(Self {
            endpoint: std::env::var("OCR_ENDPOINT").unwrap_or(defaults.endpoint),
            language: std::env::var("OCR_LANGUAGE").unwrap_or(defaults.language),
            engine: env_parse("OCR_ENGINE", defaults.engine)?,
            timeout: Duration::from_secs(env_parse("OCR_TIMEOUT_SECS", 30)?),
            max_retries: env_parse("OCR_MAX_RETRIES", defaults.max_retries)?,
            retry_backoff: Duration::from_millis(env_parse("OCR_RETRY_BACKOFF_MS", 500)?),
            api_key: defaults.api_key,
        })
    }
}

#[derive(Debug, Clone)]
pub struct KycConfig {
    pub ocr: OcrConfig,
    pub fetch_timeout: Duration,
    pub gate: IdentityGate,
}

impl KycConfig {
    pub fn new(ocr: OcrConfig) -> Self {
        Self {
            ocr,
            fetch_timeout: Duration::from_secs(30),
            gate: IdentityGate::default(),
        }
    }

    /// Load from the environment: everything [`OcrConfig::from_env`] reads, plus
    /// `KYC_FETCH_TIMEOUT_SECS` (default: 30), `KYC_REQUIRE_DOB` and
    /// `KYC_REQUIRE_GENDER` (default: false).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            ocr: OcrConfig::from_env()?,
            fetch_timeout: Duration::from_secs(env_parse("KYC_FETCH_TIMEOUT_SECS", 30)?),
            gate: IdentityGate {
                require_date_of_birth: env_parse("KYC_REQUIRE_DOB", false)?,
                require_gender: env_parse("KYC_REQUIRE_GENDER", false)?,
            },
        })
    }
}

fn env_parse<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let config = OcrConfig::new("super-secret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn test_defaults_fail_fast() {
        let config = KycConfig::new(OcrConfig::new("k"));
        assert_eq!(config.ocr.max_retries, 0);
        assert_eq!(config.ocr.endpoint, DEFAULT_OCR_ENDPOINT);
        assert!(!config.gate.require_date_of_birth);
    }

    // Single test touches the environment to avoid races between threads.
    #[test]
    fn test_env_loading() {
        std::env::remove_var("OCR_API_KEY");
        assert!(matches!(OcrConfig::from_env(), Err(ConfigError::Missing("OCR_API_KEY"))));

        std::env::set_var("OCR_API_KEY", "abc");
        std::env::set_var("OCR_MAX_RETRIES", "2");
        std::env::set_var("KYC_REQUIRE_DOB", "true");
        let config = KycConfig::from_env().unwrap();
        assert_eq!(config.ocr.api_key, "abc");
        assert_eq!(config.ocr.max_retries, 2);
        assert!(config.gate.require_date_of_birth);

        std::env::set_var("OCR_TIMEOUT_SECS", "soon");
        assert!(matches!(
            OcrConfig::from_env(),
            Err(ConfigError::Invalid { key: "OCR_TIMEOUT_SECS", .. })
        ));

        for key in ["OCR_API_KEY", "OCR_MAX_RETRIES", "KYC_REQUIRE_DOB", "OCR_TIMEOUT_SECS"] {
            std::env::remove_var(key);
        }
    }
}
