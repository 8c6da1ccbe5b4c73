pub mod config;
pub mod kyc_pipeline;
pub mod models;
pub mod processing;
pub mod utils;
pub mod validation;

pub use config::{KycConfig, OcrConfig};
pub use kyc_pipeline::KycPipeline;
pub use models::{ExtractedIdentity, Gender, IdentityField, KycOutcome, VerifiedIdentity};
pub use utils::KycError;
