use std::sync::Arc;

use oid4vc_crypto::{Signer, SignerError};
use zeroize::Zeroizing;

use crate::common_models::PublicKeyJwk;
use crate::credential_signer::{error::SigningError, SignatureProvider};
use crate::key_algorithm::provider::KeyAlgorithmProvider;

/// Issuer key held in process memory, loaded from a private JWK.
pub struct InternalSignatureProvider {
    signer: Arc<dyn Signer>,
    algorithm: String,
    key_id: Option<String>,
    public_key: Vec<u8>,
    private_key: Zeroizing<Vec<u8>>,
}

impl InternalSignatureProvider {
    /// `key_id` falls back to the `kid` of the JWK.
    pub fn from_private_jwk(
        key_algorithm_provider: &dyn KeyAlgorithmProvider,
        algorithm: &str,
        private_jwk: &str,
        key_id: Option<String>,
    ) -> Result<Self, SigningError> {
        let key_algorithm = key_algorithm_provider
            .get_key_algorithm(algorithm)
            .ok_or_else(|| SigningError::InvalidIssuerKey(format!("unsupported `{algorithm}`")))?;

        let private_key = key_algorithm
            .private_key_from_jwk(private_jwk)
            .map_err(|e| SigningError::InvalidIssuerKey(e.to_string()))?;

        let public_jwk: PublicKeyJwk = serde_json::from_str(private_jwk)
            .map_err(|e| SigningError::InvalidIssuerKey(e.to_string()))?;
        let public_key = key_algorithm
            .jwk_to_bytes(&public_jwk)
            .map_err(|e| SigningError::InvalidIssuerKey(e.to_string()))?;

        let signer = key_algorithm_provider
            .get_signer(algorithm)
            .map_err(|e| SigningError::InvalidIssuerKey(e.to_string()))?;

        Ok(Self {
            signer,
            algorithm: algorithm.to_owned(),
            key_id: key_id.or_else(|| public_jwk.key_id().map(ToOwned::to_owned)),
            public_key,
            private_key,
        })
    }
}

#[async_trait::async_trait]
impl SignatureProvider for InternalSignatureProvider {
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        self.signer
            .sign(message, &self.public_key, &self.private_key)
    }

    fn get_key_id(&self) -> Option<String> {
        self.key_id.to_owned()
    }

    fn get_public_key(&self) -> Vec<u8> {
        self.public_key.to_owned()
    }

    fn get_algorithm(&self) -> String {
        self.algorithm.to_owned()
    }
}
