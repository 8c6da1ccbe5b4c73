use crate::models::IdentityField;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KycError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Image fetch error: {message}")]
    ImageFetch { message: String, status: Option<u16> },

    #[error("OCR service error: {message}")]
    OcrService {
        message: String,
        status: Option<u16>,
        transient: bool,
    },

    #[error("Could not extract {} from the document, please upload a clearer image", join_fields(.missing))]
    ExtractionIncomplete { missing: Vec<IdentityField> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

impl KycError {
    pub fn ocr(message: impl Into<String>) -> Self {
        KycError::OcrService {
            message: message.into(),
            status: None,
            transient: false,
        }
    }

    /// Whether the OCR call that produced this error may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, KycError::OcrService { transient: true, .. })
    }
}

impl From<reqwest::Error> for KycError {
    fn from(e: reqwest::Error) -> Self {
        KycError::OcrService {
            message: e.to_string(),
            status: e.status().map(|s| s.as_u16()),
            transient: e.is_timeout() || e.is_connect() || e.is_request(),
        }
    }
}

fn join_fields(fields: &[IdentityField]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_message_names_fields() {
        let err = KycError::ExtractionIncomplete {
            missing: vec![IdentityField::IdNumber, IdentityField::Name],
        };
        assert_eq!(
            err.to_string(),
            "Could not extract ID number and name from the document, please upload a clearer image"
        );
    }

    #[test]
    fn test_only_transient_ocr_errors_retry() {
        let transient = KycError::OcrService {
            message: "503".to_string(),
            status: Some(503),
            transient: true,
        };
        assert!(transient.is_retryable());
        assert!(!KycError::ocr("bad key").is_retryable());
        assert!(!KycError::ImageDecode("junk".to_string()).is_retryable());
    }
}
