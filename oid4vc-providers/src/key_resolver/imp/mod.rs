use crate::common_models::PublicKeyJwk;
use crate::key_algorithm::provider::KeyAlgorithmProvider;

use super::{error::ResolverError, IssuerMetadata, KeyMaterial, ResolverKind};

pub mod did;
pub mod jwt_vc_issuer;
pub mod static_key;
pub mod x5c;

/// Converts a resolved JWK, refusing keys that do not fit the credential's algorithm.
pub(crate) fn key_material_from_jwk(
    key_algorithm_provider: &dyn KeyAlgorithmProvider,
    jwk: &PublicKeyJwk,
    issuer: &IssuerMetadata,
    source: ResolverKind,
) -> Result<KeyMaterial, ResolverError> {
    let parsed = key_algorithm_provider
        .parse_jwk(jwk)
        .map_err(|e| ResolverError::InvalidKey(e.to_string()))?;

    check_algorithm(&parsed.signer_algorithm_id, issuer)?;

    Ok(KeyMaterial {
        public_key: parsed.public_key_bytes,
        signer_algorithm_id: parsed.signer_algorithm_id,
        source,
    })
}

/// `iss` of the credential, provided it is one of the configured trusted issuers.
pub(crate) fn trusted_issuer<'a>(
    issuer: &'a IssuerMetadata,
    trusted_issuers: &[String],
) -> Result<&'a str, ResolverError> {
    let iss = issuer
        .issuer
        .as_deref()
        .ok_or_else(|| ResolverError::NotApplicable("credential has no issuer".to_owned()))?;

    if !trusted_issuers.iter().any(|trusted| trusted == iss) {
        return Err(ResolverError::UntrustedIssuer(iss.to_owned()));
    }

    Ok(iss)
}

pub(crate) fn check_algorithm(
    signer_algorithm_id: &str,
    issuer: &IssuerMetadata,
) -> Result<(), ResolverError> {
    if !signer_algorithm_id.eq_ignore_ascii_case(&issuer.algorithm) {
        return Err(ResolverError::InvalidKey(format!(
            "key is a `{signer_algorithm_id}` key, credential is signed with `{}`",
            issuer.algorithm
        )));
    }
    Ok(())
}
