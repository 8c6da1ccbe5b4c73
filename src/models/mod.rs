pub mod data;

pub use data::{ExtractedIdentity, Gender, IdentityField, KycOutcome, VerifiedIdentity};
