use std::sync::Arc;

use oid4vc_crypto::Signer;

use super::{error::KeyAlgorithmProviderError, KeyAlgorithm};
use crate::common_models::PublicKeyJwk;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedPublicKeyJwk {
    pub public_key_bytes: Vec<u8>,
    pub signer_algorithm_id: String,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait KeyAlgorithmProvider: Send + Sync {
    fn get_key_algorithm(&self, algorithm: &str) -> Option<Arc<dyn KeyAlgorithm>>;

    fn get_signer(&self, algorithm: &str) -> Result<Arc<dyn Signer>, KeyAlgorithmProviderError>;

    fn parse_jwk(&self, key: &PublicKeyJwk)
        -> Result<ParsedPublicKeyJwk, KeyAlgorithmProviderError>;
}
