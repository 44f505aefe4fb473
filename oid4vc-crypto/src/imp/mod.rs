use std::{collections::HashMap, sync::Arc};

use super::{CryptoProvider, CryptoProviderError, Hasher, Signer};

pub mod hasher;
pub mod signer;
pub mod utilities;


pub const SHA_256: &str = "sha-256";
pub const ES256: &str = "ES256";

#[derive(Clone)]
pub struct CryptoProviderImpl {
    hashers: HashMap<String, Arc<dyn Hasher>>,
    signers: HashMap<String, Arc<dyn Signer>>,
}

impl CryptoProviderImpl {
    pub fn new(
        hashers: HashMap<String, Arc<dyn Hasher>>,
        signers: HashMap<String, Arc<dyn Signer>>,
    ) -> Self {
        Self { hashers, signers }
    }
}

impl Default for CryptoProviderImpl {
    /// SHA-256 and ES256, the only primitives SD-JWT VC and mdoc need here.
    fn default() -> Self {
        let hashers: HashMap<String, Arc<dyn Hasher>> =
            HashMap::from([(SHA_256.to_owned(), Arc::new(hasher::sha256::SHA256 {}) as _)]);
        let signers: HashMap<String, Arc<dyn Signer>> =
            HashMap::from([(ES256.to_owned(), Arc::new(signer::es256::ES256Signer {}) as _)]);

        Self::new(hashers, signers)
    }
}

impl CryptoProvider for CryptoProviderImpl {
    fn get_hasher(&self, hasher: &str) -> Result<Arc<dyn Hasher>, CryptoProviderError> {
        Ok(self
            .hashers
            .get(hasher)
            .ok_or(CryptoProviderError::MissingHasher(hasher.to_owned()))?
            .clone())
    }

    fn get_signer(&self, signer: &str) -> Result<Arc<dyn Signer>, CryptoProviderError> {
        Ok(self
            .signers
            .get(signer)
            .ok_or(CryptoProviderError::MissingSigner(signer.to_owned()))?
            .clone())
    }
}
