use crate::utils::KycError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

/// Where a document image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Url(String),
    Bytes(Vec<u8>),
    File(PathBuf),
    /// `data:<mime>;base64,<payload>` as produced by browser uploads.
    DataUri(String),
}

impl ImageSource {
    /// Classify a CLI/user supplied location: `http(s)://` is a URL,
    /// `data:` is an inline data URI, anything else a local path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            ImageSource::Url(location.to_string())
        } else if location.starts_with("data:") {
            ImageSource::DataUri(location.to_string())
        } else {
            ImageSource::File(PathBuf::from(location))
        }
    }
}

pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, KycError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            KycError::ImageFetch {
                message: format!("Failed to build HTTP client: {}", e),
                status: None,
            }
        })?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn load(&self, source: ImageSource) -> Result<Vec<u8>, KycError> {
        match source {
            ImageSource::Bytes(bytes) => Ok(bytes),
            ImageSource::File(path) => tokio::fs::read(&path).await.map_err(|e| KycError::ImageFetch {
                message: format!("Failed to read {}: {}", path.display(), e),
                status: None,
            }),
            ImageSource::DataUri(uri) => decode_data_uri(&uri),
            ImageSource::Url(url) => self.fetch(&url).await,
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, KycError> {
        log::debug!("Fetching document image from {}", url);

        let resp = self.client.get(url).send().await.map_err(|e| KycError::ImageFetch {
            message: format!("Failed to download image: {}", e),
            status: None,
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(KycError::ImageFetch {
                message: format!("Image host returned HTTP {}", status.as_u16()),
                status: Some(status.as_u16()),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| KycError::ImageFetch {
            message: format!("Failed to read image body: {}", e),
            status: Some(status.as_u16()),
        })?;
        Ok(bytes.to_vec())
    }
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>, KycError> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| KycError::ImageDecode("Data URI has no payload".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(KycError::ImageDecode(
            "Only base64 data URIs are supported".to_string(),
        ));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| KycError::ImageDecode(format!("Invalid base64 payload: {}", e)))
}
