use crate::config::KycConfig;
use crate::models::{KycOutcome, VerifiedIdentity};
use crate::processing::{
    IdentityExtractor, ImageFetcher, ImageProcessor, ImageSource, OcrSpaceClient, TextRecognizer,
};
use crate::utils::KycError;
use crate::validation::IdentityGate;

/// One KYC document check: acquire the image, enhance it, OCR it, extract
/// the identity fields and apply the acceptance gate. Each run is
/// independent and holds no state between calls.
pub struct KycPipeline<R = OcrSpaceClient> {
    fetcher: ImageFetcher,
    recognizer: R,
    extractor: IdentityExtractor,
    gate: IdentityGate,
}

impl KycPipeline<OcrSpaceClient> {
    pub fn from_config(config: KycConfig) -> Result<Self, KycError> {
        let fetcher = ImageFetcher::new(config.fetch_timeout)?;
        let recognizer = OcrSpaceClient::new(config.ocr)?;
        Ok(Self::new(fetcher, recognizer, config.gate))
    }
}

impl<R: TextRecognizer> KycPipeline<R> {
    pub fn new(fetcher: ImageFetcher, recognizer: R, gate: IdentityGate) -> Self {
        KycPipeline {
            fetcher,
            recognizer,
            extractor: IdentityExtractor::default(),
            gate,
        }
    }

    pub fn with_extractor(mut self, extractor: IdentityExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn gate(&self) -> &IdentityGate {
        &self.gate
    }

    pub async fn verify(&self, source: ImageSource) -> Result<VerifiedIdentity, KycError> {
        // Step 1: Acquire the document image
        let image = self.fetcher.load(source).await?;

        // Step 2: Enhance for OCR
        let enhanced = ImageProcessor::enhance(&image)?;

        // Step 3: Recognise text
        let raw_text = self.recognizer.recognize(&enhanced).await?;
        log::debug!("OCR text:\n{}", raw_text);

        // Step 4: Extract fields and apply the gate
        self.verify_text(raw_text)
    }

    /// Extraction and gate only, for text that was already recognised.
    pub fn verify_text(&self, raw_text: impl Into<String>) -> Result<VerifiedIdentity, KycError> {
        let raw_text = raw_text.into();
        let identity = self.extractor.extract(&raw_text);
        self.gate.validate(identity, raw_text)
    }

    /// Like [`verify`](Self::verify) but folds every error into the uniform
    /// `{ success: false, error }` shape.
    pub async fn run(&self, source: ImageSource) -> KycOutcome {
        Self::into_outcome(self.verify(source).await)
    }

    pub fn run_text(&self, raw_text: impl Into<String>) -> KycOutcome {
        Self::into_outcome(self.verify_text(raw_text))
    }

    fn into_outcome(result: Result<VerifiedIdentity, KycError>) -> KycOutcome {
        match result {
            Ok(verified) => {
                log::info!(
                    "KYC document accepted for ID {}",
                    verified.identity.masked_id_number().unwrap_or_default()
                );
                KycOutcome::accepted(verified)
            }
            Err(err) => {
                log::warn!("KYC document rejected: {}", err);
                KycOutcome::rejected(err.to_string())
            }
        }
    }
}
