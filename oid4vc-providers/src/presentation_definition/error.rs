use thiserror::Error;

/// Errors in the definition itself, never in the presented claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatcherError {
    #[error("Invalid JSONPath `{path}`: `{reason}`")]
    InvalidPath { path: String, reason: String },
    #[error("Invalid filter of field `{field}`: `{reason}`")]
    InvalidFilter { field: String, reason: String },
}
