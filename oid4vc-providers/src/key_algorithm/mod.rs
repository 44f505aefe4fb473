//! Conversions between key representations (JWK, SEC1 bytes, DER SPKI, multibase).

use zeroize::Zeroizing;

use crate::common_models::PublicKeyJwk;
use error::KeyAlgorithmError;

pub mod error;
pub mod imp;
pub mod provider;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait KeyAlgorithm: Send + Sync {
    /// Related crypto signer ID.
    fn get_signer_algorithm_id(&self) -> String;

    /// base58-btc multibase form as used by `did:key`.
    fn get_multibase(&self, public_key: &[u8]) -> Result<String, KeyAlgorithmError>;

    fn bytes_to_jwk(
        &self,
        bytes: &[u8],
        r#use: Option<String>,
    ) -> Result<PublicKeyJwk, KeyAlgorithmError>;

    fn jwk_to_bytes(&self, jwk: &PublicKeyJwk) -> Result<Vec<u8>, KeyAlgorithmError>;

    fn public_key_from_der(&self, public_key_der: &[u8]) -> Result<Vec<u8>, KeyAlgorithmError>;

    /// Parses a private JWK (with `d`) into raw private key bytes.
    fn private_key_from_jwk(&self, jwk: &str) -> Result<Zeroizing<Vec<u8>>, KeyAlgorithmError>;
}
