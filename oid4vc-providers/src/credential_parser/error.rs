use thiserror::Error;

/// Reasons a single parser refused a presentation.
///
/// The chain treats all of them alike; they only differ in logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Malformed presentation: `{0}`")]
    Malformed(String),
    #[error("Could not decode presentation: `{0}`")]
    Decode(String),
    #[error("Credential type not accepted: `{0}`")]
    TypeMismatch(String),
    #[error("Integrity check failed: `{0}`")]
    Integrity(String),
    #[error("Could not render credential image: `{0}`")]
    Render(String),
    #[error("No parser recognized the presentation")]
    Unrecognized,
}

impl ParseError {
    pub fn error_code(&self) -> &'static str {
        "PARSE_ERROR"
    }
}
