//! Issuance side: selective-disclosure signing of credential payloads.

use serde_json::{Map, Value};

use error::SigningError;
use model::{CredentialHeader, DisclosureFrame, IssuedCredential};
use oid4vc_crypto::SignerError;

pub mod error;
pub mod imp;
pub mod model;


/// Signs arbitrary bytes with the issuer key, wherever that key lives.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait SignatureProvider: Send + Sync {
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;
    fn get_key_id(&self) -> Option<String>;
    fn get_public_key(&self) -> Vec<u8>;
    /// JWS `alg` value, e.g. `ES256`
    fn get_algorithm(&self) -> String;
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialSigner: Send + Sync {
    /// Blinds every field the frame marks, signs the result and returns the compact credential.
    ///
    /// All-or-nothing: any precondition failure aborts before the signature is produced.
    async fn sign(
        &self,
        payload: Map<String, Value>,
        header: CredentialHeader,
        frame: &DisclosureFrame,
    ) -> Result<IssuedCredential, SigningError>;
}
