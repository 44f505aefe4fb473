use oid4vc_providers::credential_parser::error::ParseError;
use oid4vc_providers::credential_signer::error::SigningError;
use oid4vc_providers::identity_store::error::IdentityStoreError;
use oid4vc_providers::image_renderer::error::RenderError;
use oid4vc_providers::key_resolver::error::{KeyResolutionError, ResolverError};
use oid4vc_providers::presentation_definition::error::MatcherError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error("Cannot generate credential: family_name, given_name or birthdate is missing")]
    MissingIdentityFields,
    #[error("Profile not found")]
    ProfileNotFound,
    #[error("Requested credential type `{requested}` does not match `{expected}`")]
    TypeMismatch { expected: String, requested: String },
    #[error("Session scope does not grant `{0}`")]
    ScopeDenied(String),
    #[error("Holder key missing")]
    MissingHolderKey,
    #[error("Disclosure frame references an unknown claim: `{0}`")]
    UnknownDisclosureFrameKey(String),
    #[error("Invalid identity record: `{0}`")]
    InvalidRecord(String),
    #[error("Signing error: `{0}`")]
    Signing(SigningError),
    #[error("Identity store error: `{0}`")]
    Store(#[from] IdentityStoreError),
    #[error("Render error: `{0}`")]
    Render(#[from] RenderError),
}

impl IssuanceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            IssuanceError::MissingIdentityFields => "MISSING_IDENTITY_FIELDS",
            IssuanceError::ProfileNotFound => "PROFILE_NOT_FOUND",
            IssuanceError::TypeMismatch { .. } => "TYPE_MISMATCH",
            IssuanceError::ScopeDenied(_) => "SCOPE_DENIED",
            IssuanceError::MissingHolderKey => "MISSING_HOLDER_KEY",
            IssuanceError::UnknownDisclosureFrameKey(_) => "UNKNOWN_DISCLOSURE_FRAME_KEY",
            IssuanceError::InvalidRecord(_) => "INVALID_RECORD",
            IssuanceError::Signing(_) => "SIGNING_ERROR",
            IssuanceError::Store(_) => "IDENTITY_STORE_ERROR",
            IssuanceError::Render(_) => "RENDER_ERROR",
        }
    }
}

impl From<SigningError> for IssuanceError {
    fn from(error: SigningError) -> Self {
        match error {
            SigningError::MissingHolderKey => IssuanceError::MissingHolderKey,
            SigningError::UnknownDisclosureFrameKey(key) => {
                IssuanceError::UnknownDisclosureFrameKey(key)
            }
            other => IssuanceError::Signing(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Unknown presentation definition: `{0}`")]
    UnknownPresentationDefinition(String),
    #[error("Presentation definition is not selectable: `{0}`")]
    NotSelectable(String),
    #[error("Parse error: `{0}`")]
    Parse(#[from] ParseError),
    #[error("Matcher error: `{0}`")]
    Matcher(#[from] MatcherError),
    #[error("Key resolution error: `{0}`")]
    KeyResolution(#[from] KeyResolutionError),
    #[error("Signature algorithm not allowed: `{0}`")]
    AlgorithmNotAllowed(String),
    #[error("Invalid credential signature: `{0}`")]
    InvalidSignature(String),
    #[error("Presentation was not accepted")]
    NotAccepted,
    #[error("Field not disclosed: `{0}`")]
    MissingDisclosedField(String),
}

impl VerificationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            VerificationError::UnknownPresentationDefinition(_) => {
                "UNKNOWN_PRESENTATION_DEFINITION"
            }
            VerificationError::NotSelectable(_) => "NOT_SELECTABLE",
            VerificationError::Parse(error) => error.error_code(),
            VerificationError::Matcher(_) => "INVALID_PRESENTATION_DEFINITION",
            VerificationError::KeyResolution(_) => "KEY_RESOLUTION_FAILED",
            VerificationError::AlgorithmNotAllowed(_) => "ALGORITHM_NOT_ALLOWED",
            VerificationError::InvalidSignature(_) => "INVALID_SIGNATURE",
            VerificationError::NotAccepted => "NOT_ACCEPTED",
            VerificationError::MissingDisclosedField(_) => "MISSING_DISCLOSED_FIELD",
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid issuer key: `{0}`")]
    IssuerKey(#[from] SigningError),
    #[error("Invalid resolver configuration: `{0}`")]
    Resolver(#[from] ResolverError),
}
