use std::cmp::Reverse;
use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use super::error::SigningError;
use crate::jwt::mapper::string_to_b64url_string;

/// Claims that are never blinded: holder binding, type, identifiers and validity.
pub const ALWAYS_VISIBLE_CLAIMS: [&str; 8] =
    ["cnf", "vct", "jti", "iss", "iat", "exp", "_sd", "_sd_alg"];

/// JWS `typ` of an issued SD-JWT credential. Selects how type metadata is embedded.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum CredentialTyp {
    #[default]
    #[serde(rename = "JWT")]
    #[strum(serialize = "JWT")]
    Jwt,
    #[serde(rename = "vc+sd-jwt")]
    #[strum(serialize = "vc+sd-jwt")]
    VcSdJwt,
    #[serde(rename = "dc+sd-jwt")]
    #[strum(serialize = "dc+sd-jwt")]
    DcSdJwt,
}

impl CredentialTyp {
    pub fn type_metadata_embedding(&self) -> TypeMetadataEmbedding {
        match self {
            CredentialTyp::Jwt => TypeMetadataEmbedding::Inline,
            CredentialTyp::VcSdJwt | CredentialTyp::DcSdJwt => TypeMetadataEmbedding::EncodedArray,
        }
    }

    /// Credential format designation returned to the wallet.
    pub fn format(&self) -> &'static str {
        match self {
            CredentialTyp::Jwt | CredentialTyp::VcSdJwt => "vc+sd-jwt",
            CredentialTyp::DcSdJwt => "dc+sd-jwt",
        }
    }
}

/// How the `vctm` header carries the type metadata document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeMetadataEmbedding {
    /// the document itself
    Inline,
    /// array of base64url encoded JSON documents
    EncodedArray,
}

impl TypeMetadataEmbedding {
    pub fn embed(&self, metadata: &Value) -> Result<Value, SigningError> {
        match self {
            TypeMetadataEmbedding::Inline => Ok(metadata.to_owned()),
            TypeMetadataEmbedding::EncodedArray => {
                let json = serde_json::to_string(metadata)
                    .map_err(|e| SigningError::TypeMetadata(e.to_string()))?;
                let encoded = string_to_b64url_string(&json)?;
                Ok(Value::Array(vec![Value::String(encoded)]))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CredentialHeader {
    pub typ: CredentialTyp,
    pub embedding: TypeMetadataEmbedding,
    pub type_metadata: Option<Value>,
    /// overrides the key id of the signature provider
    pub key_id: Option<String>,
}

impl CredentialHeader {
    pub fn new(typ: CredentialTyp) -> Self {
        Self {
            typ,
            embedding: typ.type_metadata_embedding(),
            type_metadata: None,
            key_id: None,
        }
    }

    pub fn with_type_metadata(mut self, metadata: Value) -> Self {
        self.type_metadata = Some(metadata);
        self
    }

    pub fn with_embedding(mut self, embedding: TypeMetadataEmbedding) -> Self {
        self.embedding = embedding;
        self
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }
}

/// Claim paths (`.` separated for nested members) the holder may later hide.
///
/// Only built against a payload; every path must exist there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisclosureFrame {
    entries: BTreeMap<String, bool>,
}

impl DisclosureFrame {
    pub fn new(
        entries: impl IntoIterator<Item = (String, bool)>,
        payload: &Map<String, Value>,
    ) -> Result<Self, SigningError> {
        let frame = Self {
            entries: entries.into_iter().collect(),
        };
        frame.validate(payload)?;
        Ok(frame)
    }

    pub fn validate(&self, payload: &Map<String, Value>) -> Result<(), SigningError> {
        for (path, disclosable) in &self.entries {
            if *disclosable && is_always_visible(path) {
                return Err(SigningError::AlwaysVisibleClaim(path.to_owned()));
            }

            if lookup(payload, path).is_none() {
                return Err(SigningError::UnknownDisclosureFrameKey(path.to_owned()));
            }
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        !self.entries.values().any(|disclosable| *disclosable)
    }

    /// Paths marked disclosable, deepest first so nested members are blinded before their parent.
    pub fn disclosed_paths(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, disclosable)| **disclosable)
            .map(|(path, _)| path.as_str())
            .sorted_by_key(|path| Reverse(path.split('.').count()))
            .collect()
    }
}

fn is_always_visible(path: &str) -> bool {
    let mut segments = path.split('.');
    let top_level = segments.next().unwrap_or_default();

    ALWAYS_VISIBLE_CLAIMS.contains(&top_level) || segments.any(|segment| segment.starts_with("_sd"))
}

fn lookup<'a>(payload: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = payload.get(segments.next()?)?;

    segments.try_fold(first, |current, segment| current.as_object()?.get(segment))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCredential {
    pub format: String,
    pub credential: String,
}
