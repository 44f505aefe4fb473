use thiserror::Error;

/// Failure of a single resolver. The chain treats every variant as "try the next one".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    #[error("Resolver not applicable: `{0}`")]
    NotApplicable(String),
    #[error("Key not found: `{0}`")]
    KeyNotFound(String),
    #[error("Invalid key: `{0}`")]
    InvalidKey(String),
    #[error("Could not fetch issuer metadata: `{0}`")]
    Http(String),
    #[error("Invalid certificate: `{0}`")]
    InvalidCertificate(String),
    #[error("Untrusted certificate chain: `{0}`")]
    UntrustedCertificate(String),
    #[error("Untrusted issuer: `{0}`")]
    UntrustedIssuer(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyResolutionError {
    #[error("Key resolution failed, attempts: `{}`", .attempts.join("; "))]
    KeyResolutionFailed { attempts: Vec<String> },
}
