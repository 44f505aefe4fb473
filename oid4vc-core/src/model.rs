use oid4vc_providers::common_models::CanonicalClaims;
use oid4vc_providers::identity_store::model::IdentityQuery;
use oid4vc_providers::presentation_definition::model::DisclosedField;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::IdentityFieldMapping;
use crate::service::error::{IssuanceError, VerificationError};

/// Authenticated holder state the issuer works from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceSession {
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    /// space separated OAuth scope tokens
    #[serde(default)]
    pub scope: Option<String>,
}

impl IssuanceSession {
    /// Empty values count as missing.
    pub fn identity_query(&self) -> Result<IdentityQuery, IssuanceError> {
        let present = |value: &Option<String>| {
            value.as_ref().filter(|value| !value.is_empty()).cloned()
        };

        match (
            present(&self.family_name),
            present(&self.given_name),
            present(&self.birthdate),
        ) {
            (Some(family_name), Some(given_name), Some(birthdate)) => Ok(IdentityQuery {
                family_name,
                given_name,
                birthdate,
            }),
            _ => Err(IssuanceError::MissingIdentityFields),
        }
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope
            .as_deref()
            .is_some_and(|tokens| tokens.split(' ').any(|token| token == scope))
    }
}

/// Body of the credential endpoint request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRequest {
    #[serde(default)]
    pub vct: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialViewRow {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCredentialView {
    pub rows: Vec<CredentialViewRow>,
}

/// Preview of the credential shown to the holder before issuance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredentialView {
    pub credential_id: String,
    pub credential_supported_object: Value,
    pub view: RawCredentialView,
    /// data URI
    pub credential_image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationOutcome {
    pub accepted: bool,
    /// unmet constraint fields, by name
    pub missing: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_descriptor: Option<String>,
    pub claims: CanonicalClaims,
    /// data URI
    pub credential_image: String,
    pub disclosed: Vec<DisclosedField>,
    /// key binding JWT as presented, not verified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_binding: Option<String>,
}

impl VerificationOutcome {
    /// Issuance session of the subject of an accepted PID presentation.
    pub fn identity_session(
        &self,
        mapping: &IdentityFieldMapping,
    ) -> Result<IssuanceSession, VerificationError> {
        if !self.accepted {
            return Err(VerificationError::NotAccepted);
        }

        Ok(IssuanceSession {
            family_name: Some(self.disclosed_text(&mapping.family_name)?),
            given_name: Some(self.disclosed_text(&mapping.given_name)?),
            birthdate: Some(self.disclosed_text(&mapping.birthdate)?),
            scope: None,
        })
    }

    fn disclosed_text(&self, name: &str) -> Result<String, VerificationError> {
        let field = self
            .disclosed
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| VerificationError::MissingDisclosedField(name.to_owned()))?;

        Ok(match &field.value {
            Value::String(text) => text.to_owned(),
            other => other.to_string(),
        })
    }
}
