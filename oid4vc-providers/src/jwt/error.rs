use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Missing token part: `{0}`")]
    MissingPart(&'static str),
    #[error("Could not decode token: `{0}`")]
    CouldNotDecode(String),
    #[error("Could not format token: `{0}`")]
    CouldNotFormat(String),
    #[error("Could not sign: `{0}`")]
    CouldNotSign(String),
}
