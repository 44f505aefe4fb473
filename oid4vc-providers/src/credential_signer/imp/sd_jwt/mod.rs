//! SD-JWT VC issuance.
//
// https://www.ietf.org/archive/id/draft-ietf-oauth-selective-disclosure-jwt-08.html

use std::sync::Arc;

use oid4vc_crypto::imp::{utilities::generate_salt_base64_16, SHA_256};
use oid4vc_crypto::{CryptoProvider, Hasher};
use serde_json::{json, Map, Value};

use crate::common_models::PublicKeyJwk;
use crate::credential_signer::error::SigningError;
use crate::credential_signer::model::{CredentialHeader, DisclosureFrame, IssuedCredential};
use crate::credential_signer::{CredentialSigner, SignatureProvider};
use crate::jwt::mapper::string_to_b64url_string;
use crate::jwt::model::JwtHeader;
use crate::jwt::Jwt;

#[cfg(test)]
mod test;

pub const SELECTIVE_DISCLOSURE_MARKER: &str = "_sd";
pub const SELECTIVE_DISCLOSURE_ALG_MARKER: &str = "_sd_alg";

pub struct SdJwtCredentialSigner {
    crypto: Arc<dyn CryptoProvider>,
    signature_provider: Arc<dyn SignatureProvider>,
}

impl SdJwtCredentialSigner {
    pub fn new(
        crypto: Arc<dyn CryptoProvider>,
        signature_provider: Arc<dyn SignatureProvider>,
    ) -> Self {
        Self {
            crypto,
            signature_provider,
        }
    }
}

#[async_trait::async_trait]
impl CredentialSigner for SdJwtCredentialSigner {
    async fn sign(
        &self,
        mut payload: Map<String, Value>,
        header: CredentialHeader,
        frame: &DisclosureFrame,
    ) -> Result<IssuedCredential, SigningError> {
        holder_key(&payload)?;
        frame.validate(&payload)?;

        let hasher = self
            .crypto
            .get_hasher(SHA_256)
            .map_err(|e| SigningError::Hashing(e.to_string()))?;

        let disclosures = frame
            .disclosed_paths()
            .into_iter()
            .map(|path| blind(&mut payload, path, &*hasher))
            .collect::<Result<Vec<String>, SigningError>>()?;

        payload.insert(
            SELECTIVE_DISCLOSURE_ALG_MARKER.to_owned(),
            Value::String(SHA_256.to_owned()),
        );

        let mut jwt_header = JwtHeader::new(self.signature_provider.get_algorithm());
        jwt_header.signature_type = Some(header.typ.to_string());
        jwt_header.key_id = header
            .key_id
            .clone()
            .or_else(|| self.signature_provider.get_key_id());
        jwt_header.vctm = header
            .type_metadata
            .as_ref()
            .map(|metadata| header.embedding.embed(metadata))
            .transpose()?;

        let mut credential = Jwt::new(jwt_header, Value::Object(payload))
            .tokenize(&*self.signature_provider)
            .await?;

        for disclosure in &disclosures {
            credential.push('~');
            credential.push_str(disclosure);
        }
        credential.push('~');

        tracing::debug!(
            typ = %header.typ,
            disclosures = disclosures.len(),
            "SD-JWT credential signed"
        );

        Ok(IssuedCredential {
            format: header.typ.format().to_owned(),
            credential,
        })
    }
}

fn holder_key(payload: &Map<String, Value>) -> Result<PublicKeyJwk, SigningError> {
    let jwk = payload
        .get("cnf")
        .and_then(|cnf| cnf.get("jwk"))
        .ok_or(SigningError::MissingHolderKey)?;

    serde_json::from_value(jwk.to_owned()).map_err(|_| SigningError::MissingHolderKey)
}

/// Moves the claim at `path` into a salted disclosure and leaves its digest in the parent `_sd`.
fn blind(
    payload: &mut Map<String, Value>,
    path: &str,
    hasher: &dyn Hasher,
) -> Result<String, SigningError> {
    let (parent, name) = match path.rsplit_once('.') {
        Some((parent_path, name)) => (object_at(payload, parent_path, path)?, name),
        None => (payload, path),
    };

    let value = parent
        .remove(name)
        .ok_or_else(|| SigningError::UnknownDisclosureFrameKey(path.to_owned()))?;

    let disclosure_json = serde_json::to_string(&json!([generate_salt_base64_16(), name, value]))
        .map_err(|e| SigningError::InvalidPayload(e.to_string()))?;
    let disclosure = string_to_b64url_string(&disclosure_json)?;

    let digest = hasher
        .hash_base64(disclosure.as_bytes())
        .map_err(|e| SigningError::Hashing(e.to_string()))?;

    let Value::Array(digests) = parent
        .entry(SELECTIVE_DISCLOSURE_MARKER)
        .or_insert_with(|| Value::Array(vec![]))
    else {
        return Err(SigningError::InvalidPayload(format!(
            "`{SELECTIVE_DISCLOSURE_MARKER}` next to `{path}` is not an array"
        )));
    };
    digests.push(Value::String(digest));
    digests.sort_by(|a, b| a.as_str().cmp(&b.as_str()));

    Ok(disclosure)
}

fn object_at<'a>(
    payload: &'a mut Map<String, Value>,
    parent_path: &str,
    path: &str,
) -> Result<&'a mut Map<String, Value>, SigningError> {
    parent_path
        .split('.')
        .try_fold(payload, |current, segment| {
            current.get_mut(segment).and_then(Value::as_object_mut)
        })
        .ok_or_else(|| SigningError::UnknownDisclosureFrameKey(path.to_owned()))
}
