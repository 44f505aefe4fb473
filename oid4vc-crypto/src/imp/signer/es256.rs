use p256::{
    ecdsa::{
        signature::{Signer as _, Verifier as _},
        Signature, SigningKey, VerifyingKey,
    },
    EncodedPoint,
};
use rand::thread_rng;
use zeroize::Zeroizing;

use crate::{Signer, SignerError};

/// ECDSA over P-256 with SHA-256. Signatures are the fixed size `r || s` form used by JWS and COSE.
pub struct ES256Signer {}

impl ES256Signer {
    fn verifying_key(public_key: &[u8]) -> Result<VerifyingKey, SignerError> {
        let point = EncodedPoint::from_bytes(public_key).map_err(|err| {
            SignerError::CouldNotExtractPublicKey(format!(
                "couldn't initialize verifying key: {err}"
            ))
        })?;
        VerifyingKey::from_encoded_point(&point).map_err(|err| {
            SignerError::CouldNotExtractPublicKey(format!(
                "couldn't initialize verifying key: {err}"
            ))
        })
    }

    fn signing_key(private_key: &[u8]) -> Result<SigningKey, SignerError> {
        SigningKey::from_slice(private_key).map_err(|err| {
            SignerError::CouldNotExtractPublicKey(format!("couldn't initialize secret key: {err}"))
        })
    }

    /// Normalizes any SEC1 encoding of a public key to its compressed form.
    pub fn to_bytes(public_key: &[u8]) -> Result<Vec<u8>, SignerError> {
        let vk = Self::verifying_key(public_key)?;
        Ok(vk.to_encoded_point(true).to_bytes().into())
    }

    /// Compressed public key belonging to `private_key`.
    pub fn public_key_from_private(private_key: &[u8]) -> Result<Vec<u8>, SignerError> {
        let sk = Self::signing_key(private_key)?;
        Ok(VerifyingKey::from(&sk)
            .to_encoded_point(true)
            .to_bytes()
            .into())
    }

    /// Fresh key pair as (private scalar, compressed public key).
    pub fn random() -> (Zeroizing<Vec<u8>>, Vec<u8>) {
        let sk = SigningKey::random(&mut thread_rng());
        let pk = VerifyingKey::from(&sk);
        (
            Zeroizing::new(sk.to_bytes().to_vec()),
            pk.to_encoded_point(true).to_bytes().into(),
        )
    }
}

impl Signer for ES256Signer {
    fn sign(
        &self,
        input: &[u8],
        public_key: &[u8],
        private_key: &[u8],
    ) -> Result<Vec<u8>, SignerError> {
        let sk = Self::signing_key(private_key)?;
        let expected = Self::verifying_key(public_key)?;

        if VerifyingKey::from(&sk) != expected {
            return Err(SignerError::CouldNotExtractKeyPair);
        }

        let signature: Signature = sk
            .try_sign(input)
            .map_err(|err| SignerError::CouldNotSign(err.to_string()))?;
        Ok(signature.to_vec())
    }

    fn verify(&self, input: &[u8], signature: &[u8], public_key: &[u8]) -> Result<(), SignerError> {
        let vk = Self::verifying_key(public_key)?;

        let signature =
            Signature::try_from(signature).map_err(|_| SignerError::InvalidSignature)?;

        vk.verify(input, &signature)
            .map_err(|err| SignerError::CouldNotVerify(format!("couldn't verify: {err}")))
    }
}
