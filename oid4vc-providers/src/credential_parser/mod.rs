//! Presentation side: decoding of presented credentials into canonical claims.
//!
//! One parser per wire format. [`chain::ParserChain`] tries them in the order the
//! deployment configured and keeps the first success.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::common_models::CanonicalClaims;
use crate::key_resolver::IssuerMetadata;
use error::ParseError;

pub mod chain;
pub mod error;
pub mod imp;


pub type ParseResult = Result<ParsedCredential, ParseError>;

/// Credential as submitted by the holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPresentation {
    Text(String),
    Bytes(Vec<u8>),
}

impl RawPresentation {
    /// Textual form; byte input must be UTF-8.
    pub fn as_text(&self) -> Result<&str, ParseError> {
        match self {
            RawPresentation::Text(text) => Ok(text.trim()),
            RawPresentation::Bytes(bytes) => std::str::from_utf8(bytes)
                .map(str::trim)
                .map_err(|e| ParseError::Malformed(e.to_string())),
        }
    }
}

impl From<String> for RawPresentation {
    fn from(value: String) -> Self {
        RawPresentation::Text(value)
    }
}

impl From<&str> for RawPresentation {
    fn from(value: &str) -> Self {
        RawPresentation::Text(value.to_owned())
    }
}

impl From<Vec<u8>> for RawPresentation {
    fn from(value: Vec<u8>) -> Self {
        RawPresentation::Bytes(value)
    }
}

/// Bytes covered by the issuer signature, checked once the issuer key is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedContent {
    pub algorithm: String,
    pub signing_input: Vec<u8>,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCredential {
    /// data URI
    pub credential_image: String,
    pub claims: CanonicalClaims,
    pub issuer: IssuerMetadata,
    pub signed: SignedContent,
    /// key binding JWT, passed through unverified
    pub key_binding: Option<String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ParserKind {
    SdJwt,
    Mdoc,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialParser: Send + Sync {
    async fn parse(&self, raw: &RawPresentation) -> ParseResult;
}
