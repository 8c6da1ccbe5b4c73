use crate::config::OcrConfig;
use crate::utils::KycError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Anything that turns a document image into raw text.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String, KycError>;
}

/// Client for the OCR.space style `parse/image` endpoint.
#[derive(Debug, Clone)]
pub struct OcrSpaceClient {
    config: OcrConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<ProviderMessage>,
    #[serde(default)]
    error_details: Option<ProviderMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: Option<String>,
    #[serde(default)]
    error_message: Option<ProviderMessage>,
}

/// The provider reports errors either as a single string or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProviderMessage {
    One(String),
    Many(Vec<String>),
}

impl ProviderMessage {
    fn joined(&self) -> String {
        match self {
            ProviderMessage::One(s) => s.trim().to_string(),
            ProviderMessage::Many(v) => v
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

impl OcrSpaceResponse {
    fn provider_message(&self) -> Option<String> {
        let first_result = self
            .parsed_results
            .as_ref()
            .and_then(|r| r.first())
            .and_then(|r| r.error_message.as_ref());

        [self.error_message.as_ref(), self.error_details.as_ref(), first_result]
            .into_iter()
            .flatten()
            .map(ProviderMessage::joined)
            .find(|m| !m.is_empty())
    }

    fn into_text(self) -> Result<String, KycError> {
        let provider_message = self.provider_message();
        if self.is_errored_on_processing {
            let message = provider_message
                .unwrap_or_else(|| "OCR provider failed to process the image".to_string());
            return Err(KycError::ocr(message));
        }

        self.parsed_results
            .and_then(|results| results.into_iter().next())
            .and_then(|r| r.parsed_text)
            .ok_or_else(|| {
                KycError::ocr(provider_message.unwrap_or_else(|| {
                    "OCR response did not contain any parsed text".to_string()
                }))
            })
    }
}

impl OcrSpaceClient {
    pub fn new(config: OcrConfig) -> Result<Self, KycError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    async fn request_once(&self, image: &[u8]) -> Result<String, KycError> {
        let file = Part::bytes(image.to_vec())
            .file_name("document.png")
            .mime_str("image/png")?;
        let form = Form::new()
            .text("language", self.config.language.clone())
            .text("OCREngine", self.config.engine.to_string())
            .text("isOverlayRequired", "false")
            .text("scale", "true")
            .part("file", file);

        let resp = self
            .client
            .post(&self.config.endpoint)
            .header("apikey", &self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<OcrSpaceResponse>(&body)
                .ok()
                .and_then(|r| r.provider_message())
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(KycError::OcrService {
                message: format!("OCR provider returned HTTP {}: {}", status.as_u16(), detail),
                status: Some(status.as_u16()),
                transient: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
            });
        }

        let parsed: OcrSpaceResponse = resp
            .json()
            .await
            .map_err(|e| KycError::ocr(format!("Malformed OCR response: {}", e)))?;
        parsed.into_text()
    }
}

#[async_trait]
impl TextRecognizer for OcrSpaceClient {
    async fn recognize(&self, image: &[u8]) -> Result<String, KycError> {
        let mut attempt = 0;
        loop {
            match self.request_once(image).await {
                Ok(text) => {
                    log::debug!("OCR returned {} characters", text.len());
                    return Ok(text);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "OCR attempt {} of {} failed: {}",
                        attempt,
                        self.config.max_retries + 1,
                        e
                    );
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
