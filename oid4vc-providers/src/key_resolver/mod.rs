//! Resolution of the issuer key that signed a presented credential.
//!
//! Resolvers are tried in the order the deployment configures them; the first
//! one that produces key material wins (see [`chain::PublicKeyResolverChain`]).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use error::ResolverError;

pub mod chain;
pub mod error;
pub mod imp;


/// Identification hints a credential carries about its issuer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuerMetadata {
    /// `iss` claim of SD-JWT credentials
    pub issuer: Option<String>,
    /// `kid` header, possibly a DID URL
    pub key_id: Option<String>,
    /// signature algorithm announced by the credential, e.g. `ES256`
    pub algorithm: String,
    /// DER certificates, leaf first
    pub x5c: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    /// SEC1 compressed public key
    pub public_key: Vec<u8>,
    /// crypto signer ID the key is used with
    pub signer_algorithm_id: String,
    pub source: ResolverKind,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolverKind {
    StaticKey,
    Did,
    JwtVcIssuerMetadata,
    X5c,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait PublicKeyResolver: Send + Sync {
    fn kind(&self) -> ResolverKind;

    async fn resolve(&self, issuer: &IssuerMetadata) -> Result<KeyMaterial, ResolverError>;
}
