use crate::models::{ExtractedIdentity, IdentityField, VerifiedIdentity};
use crate::utils::KycError;

/// Acceptance rule applied after extraction. An identity passes only when
/// every required field is present; there is no partial success.
///
/// The ID number and name are always required. Date of birth and gender
/// can be made mandatory per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityGate {
    pub require_date_of_birth: bool,
    pub require_gender: bool,
}

impl IdentityGate {
    pub fn required_fields(&self) -> Vec<IdentityField> {
        let mut fields = vec![IdentityField::IdNumber, IdentityField::Name];
        if self.require_date_of_birth {
            fields.push(IdentityField::DateOfBirth);
        }
        if self.require_gender {
            fields.push(IdentityField::Gender);
        }
        fields
    }

    pub fn validate(
        &self,
        identity: ExtractedIdentity,
        raw_text: String,
    ) -> Result<VerifiedIdentity, KycError> {
        let missing: Vec<IdentityField> = self
            .required_fields()
            .into_iter()
            .filter(|field| match field {
                IdentityField::IdNumber => !identity
                    .id_number
                    .as_ref()
                    .map_or(false, |id| id.len() == 12 && id.chars().all(|c| c.is_ascii_digit())),
                other => !identity.has(*other),
            })
            .collect();

        if !missing.is_empty() {
            log::info!("Rejecting identity, missing: {:?}", missing);
            return Err(KycError::ExtractionIncomplete { missing });
        }

        Ok(VerifiedIdentity { identity, raw_text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn identity(id: Option<&str>, name: Option<&str>) -> ExtractedIdentity {
        ExtractedIdentity {
            id_number: id.map(str::to_string),
            name: name.map(str::to_string),
            date_of_birth: None,
            gender: None,
        }
    }

    fn missing(result: Result<VerifiedIdentity, KycError>) -> Vec<IdentityField> {
        match result {
            Err(KycError::ExtractionIncomplete { missing }) => missing,
            other => panic!("expected incomplete extraction, got {:?}", other),
        }
    }

    #[test]
    fn test_id_and_name_accepted() {
        let gate = IdentityGate::default();
        let verified = gate
            .validate(identity(Some("123456789012"), Some("RAHUL SHARMA")), "raw".to_string())
            .unwrap();
        assert_eq!(verified.identity.name.as_deref(), Some("RAHUL SHARMA"));
        assert_eq!(verified.raw_text, "raw");
    }

    #[test]
    fn test_partial_result_is_rejected() {
        let gate = IdentityGate::default();
        assert_eq!(
            missing(gate.validate(identity(Some("123456789012"), None), String::new())),
            vec![IdentityField::Name]
        );
        assert_eq!(
            missing(gate.validate(identity(None, None), String::new())),
            vec![IdentityField::IdNumber, IdentityField::Name]
        );
    }

    #[test]
    fn test_wrong_length_id_is_missing() {
        let gate = IdentityGate::default();
        assert_eq!(
            missing(gate.validate(identity(Some("12345678901"), Some("A B")), String::new())),
            vec![IdentityField::IdNumber]
        );
    }

    #[test]
    fn test_optional_requirements() {
        let gate = IdentityGate {
            require_date_of_birth: true,
            require_gender: true,
        };
        assert_eq!(
            missing(gate.validate(identity(Some("123456789012"), Some("A B")), String::new())),
            vec![IdentityField::DateOfBirth, IdentityField::Gender]
        );

        let mut complete = identity(Some("123456789012"), Some("A B"));
        complete.date_of_birth = Some("01/01/1990".to_string());
        complete.gender = Some(Gender::Female);
        assert!(gate.validate(complete, String::new()).is_ok());
    }
}
