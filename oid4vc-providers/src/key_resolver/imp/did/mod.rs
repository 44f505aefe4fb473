//! `did:jwk` and `did:key` issuers. Both methods carry the key in the identifier itself, so only
//! configured trusted issuer DIDs are resolved.

use std::sync::Arc;

use ct_codecs::{Base64UrlSafeNoPadding, Decoder};

use super::{check_algorithm, key_material_from_jwk, trusted_issuer};
use crate::common_models::PublicKeyJwk;
use crate::key_algorithm::imp::es256::P256_MULTICODEC;
use crate::key_algorithm::provider::KeyAlgorithmProvider;
use crate::key_resolver::{
    error::ResolverError, IssuerMetadata, KeyMaterial, PublicKeyResolver, ResolverKind,
};


const DID_JWK_PREFIX: &str = "did:jwk:";
const DID_KEY_PREFIX: &str = "did:key:";

pub struct DidResolver {
    key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
    trusted_issuers: Vec<String>,
}

impl DidResolver {
    pub fn new(
        key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
        trusted_issuers: Vec<String>,
    ) -> Self {
        Self {
            key_algorithm_provider,
            trusted_issuers,
        }
    }
}

/// The trusted DID `iss`. A DID URL `kid` must point into that same DID.
fn issuer_did<'a>(
    issuer: &'a IssuerMetadata,
    trusted_issuers: &[String],
) -> Result<&'a str, ResolverError> {
    if !issuer
        .issuer
        .as_deref()
        .is_some_and(|iss| iss.starts_with("did:"))
    {
        return Err(ResolverError::NotApplicable("issuer is not a DID".to_owned()));
    }

    let did = trusted_issuer(issuer, trusted_issuers)?;

    if let Some(kid) = issuer.key_id.as_deref().filter(|kid| kid.starts_with("did:")) {
        let kid_did = kid.split('#').next().unwrap_or(kid);
        if kid_did != did {
            return Err(ResolverError::UntrustedIssuer(format!(
                "`kid` DID `{kid_did}` is not the issuer `{did}`"
            )));
        }
    }

    Ok(did)
}

pub fn extract_jwk(did: &str) -> Result<PublicKeyJwk, ResolverError> {
    let tail = did
        .strip_prefix(DID_JWK_PREFIX)
        .ok_or_else(|| ResolverError::NotApplicable("invalid did:jwk prefix".to_owned()))?;

    let bytes = Base64UrlSafeNoPadding::decode_to_vec(tail, None).map_err(|err| {
        ResolverError::InvalidKey(format!("failed to decode base64url from did:jwk: {err}"))
    })?;

    serde_json::from_slice(&bytes)
        .map_err(|err| ResolverError::InvalidKey(format!("failed to deserialize jwk: {err}")))
}

/// Public key bytes of a P-256 `did:key`.
pub fn decode_did_key(did: &str) -> Result<Vec<u8>, ResolverError> {
    let tail = did
        .strip_prefix(DID_KEY_PREFIX)
        .ok_or_else(|| ResolverError::NotApplicable("invalid did:key prefix".to_owned()))?;

    let multibase = tail
        .strip_prefix('z')
        .ok_or_else(|| ResolverError::InvalidKey("did:key is not base58-btc encoded".to_owned()))?;

    let decoded = bs58::decode(multibase).into_vec().map_err(|err| {
        ResolverError::InvalidKey(format!("invalid did:key multibase suffix: {err}"))
    })?;

    decoded
        .strip_prefix(P256_MULTICODEC.as_slice())
        .map(<[u8]>::to_vec)
        .ok_or_else(|| ResolverError::InvalidKey("unsupported did:key multicodec".to_owned()))
}

#[async_trait::async_trait]
impl PublicKeyResolver for DidResolver {
    fn kind(&self) -> ResolverKind {
        ResolverKind::Did
    }

    async fn resolve(&self, issuer: &IssuerMetadata) -> Result<KeyMaterial, ResolverError> {
        let did = issuer_did(issuer, &self.trusted_issuers)?;

        if did.starts_with(DID_JWK_PREFIX) {
            let jwk = extract_jwk(did)?;
            return key_material_from_jwk(
                self.key_algorithm_provider.as_ref(),
                &jwk,
                issuer,
                self.kind(),
            );
        }

        if did.starts_with(DID_KEY_PREFIX) {
            let public_key = decode_did_key(did)?;
            let key_algorithm = self
                .key_algorithm_provider
                .get_key_algorithm("ES256")
                .ok_or_else(|| ResolverError::InvalidKey("ES256 not supported".to_owned()))?;

            // round trip through the JWK form validates the point
            let jwk = key_algorithm
                .bytes_to_jwk(&public_key, None)
                .map_err(|e| ResolverError::InvalidKey(e.to_string()))?;
            let signer_algorithm_id = key_algorithm.get_signer_algorithm_id();
            check_algorithm(&signer_algorithm_id, issuer)?;

            return Ok(KeyMaterial {
                public_key: key_algorithm
                    .jwk_to_bytes(&jwk)
                    .map_err(|e| ResolverError::InvalidKey(e.to_string()))?,
                signer_algorithm_id,
                source: self.kind(),
            });
        }

        Err(ResolverError::NotApplicable(format!(
            "unsupported DID method: `{did}`"
        )))
    }
}
