use super::ocr::TextRecognizer;
use crate::utils::KycError;
use async_trait::async_trait;
use std::io::Write;
use tempfile::NamedTempFile;
use tesseract::Tesseract;

/// Offline recognizer backed by a local Tesseract install.
/// Honours `TESSDATA_PREFIX` like the tesseract CLI.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    language: String,
}

impl TesseractRecognizer {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    fn run(language: &str, image_data: &[u8]) -> Result<String, KycError> {
        // Tesseract reads from a path, so stage the image in a temp file
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(image_data)?;

        let image_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| KycError::ocr("Temp file path is not valid UTF-8"))?;

        Tesseract::new(None, Some(language))
            .map_err(|e| KycError::ocr(format!("Tesseract init error: {}", e)))?
            .set_image(image_path)
            .map_err(|e| KycError::ocr(format!("Tesseract set image error: {}", e)))?
            .get_text()
            .map_err(|e| KycError::ocr(format!("Tesseract error: {}", e)))
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image: &[u8]) -> Result<String, KycError> {
        let language = self.language.clone();
        let image = image.to_vec();
        tokio::task::spawn_blocking(move || Self::run(&language, &image))
            .await
            .map_err(|e| KycError::ocr(format!("Tesseract worker failed: {}", e)))?
    }
}
