use thiserror::Error;

use crate::jwt::error::JwtError;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("Disclosure frame references a claim missing from the payload: `{0}`")]
    UnknownDisclosureFrameKey(String),
    #[error("Claim must stay visible and cannot be disclosed selectively: `{0}`")]
    AlwaysVisibleClaim(String),
    #[error("Payload does not carry the holder key in `cnf.jwk`")]
    MissingHolderKey,
    #[error("Invalid payload: `{0}`")]
    InvalidPayload(String),
    #[error("Could not embed type metadata: `{0}`")]
    TypeMetadata(String),
    #[error("Could not hash disclosure: `{0}`")]
    Hashing(String),
    #[error("Invalid issuer key: `{0}`")]
    InvalidIssuerKey(String),
    #[error("JWT error: `{0}`")]
    Jwt(#[from] JwtError),
}
