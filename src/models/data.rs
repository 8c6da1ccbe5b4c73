use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
        }
    }
}

/// Fields of an identity record, used to report what a gate found missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentityField {
    IdNumber,
    Name,
    DateOfBirth,
    Gender,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IdentityField::IdNumber => write!(f, "ID number"),
            IdentityField::Name => write!(f, "name"),
            IdentityField::DateOfBirth => write!(f, "date of birth"),
            IdentityField::Gender => write!(f, "gender"),
        }
    }
}

/// Identity fields recovered from OCR text. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedIdentity {
    pub id_number: Option<String>,
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
}

impl ExtractedIdentity {
    pub fn has(&self, field: IdentityField) -> bool {
        match field {
            IdentityField::IdNumber => self.id_number.is_some(),
            IdentityField::Name => self.name.is_some(),
            IdentityField::DateOfBirth => self.date_of_birth.is_some(),
            IdentityField::Gender => self.gender.is_some(),
        }
    }

    /// ID number with all but the last four digits hidden, e.g. `XXXX XXXX 9012`.
    pub fn masked_id_number(&self) -> Option<String> {
        let id = self.id_number.as_ref()?;
        if id.len() != 12 || !id.chars().all(|c| c.is_ascii_digit()) {
            return Some("X".repeat(id.chars().count()));
        }
        Some(format!("XXXX XXXX {}", &id[8..]))
    }
}

/// An identity that passed the gate, together with the OCR text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub identity: ExtractedIdentity,
    pub raw_text: String,
}

/// The uniform result shape handed to the KYC persistence layer.
/// `success` is derived from the variant when serialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KycOutcome {
    Accepted {
        data: ExtractedIdentity,
        raw_text: String,
    },
    Rejected {
        error: String,
    },
}

impl KycOutcome {
    pub fn accepted(verified: VerifiedIdentity) -> Self {
        KycOutcome::Accepted {
            data: verified.identity,
            raw_text: verified.raw_text,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        KycOutcome::Rejected {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, KycOutcome::Accepted { .. })
    }
}

impl Serialize for KycOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KycOutcome::Accepted { data, raw_text } => {
                let mut state = serializer.serialize_struct("KycOutcome", 3)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                state.serialize_field("rawText", raw_text)?;
                state.end()
            }
            KycOutcome::Rejected { error } => {
                let mut state = serializer.serialize_struct("KycOutcome", 2)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
                state.end()
            }
        }
    }
}
