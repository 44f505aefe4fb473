//! Compact JWS handling shared by the SD-JWT signer and parser.

use serde::{de::DeserializeOwned, Serialize};

use self::{
    error::JwtError,
    mapper::{b64url_to_bin, bin_to_b64url_string, json_from_b64url, string_to_b64url_string},
    model::{DecomposedToken, JwtHeader},
};
use crate::credential_signer::SignatureProvider;

pub mod error;
pub mod mapper;
pub mod model;

#[cfg(test)]
mod test;

#[derive(Debug, Clone)]
pub struct Jwt<Payload> {
    pub header: JwtHeader,
    pub payload: Payload,
}

impl<Payload: Serialize + DeserializeOwned> Jwt<Payload> {
    pub fn new(header: JwtHeader, payload: Payload) -> Self {
        Self { header, payload }
    }

    pub async fn tokenize(&self, signer: &dyn SignatureProvider) -> Result<String, JwtError> {
        let header_json = serde_json::to_string(&self.header)
            .map_err(|e| JwtError::CouldNotFormat(e.to_string()))?;
        let payload_json = serde_json::to_string(&self.payload)
            .map_err(|e| JwtError::CouldNotFormat(e.to_string()))?;

        let mut token = format!(
            "{}.{}",
            string_to_b64url_string(&header_json)?,
            string_to_b64url_string(&payload_json)?,
        );

        let signature = signer
            .sign(token.as_bytes())
            .await
            .map_err(|e| JwtError::CouldNotSign(e.to_string()))?;

        token.push('.');
        token.push_str(&bin_to_b64url_string(&signature)?);

        Ok(token)
    }

    pub fn decompose_token(token: &str) -> Result<DecomposedToken<Payload>, JwtError> {
        let token = token.trim();
        let mut jwt_parts = token.split('.');

        let header = jwt_parts.next().ok_or(JwtError::MissingPart("header"))?;
        let payload = jwt_parts.next().ok_or(JwtError::MissingPart("payload"))?;
        let signature = jwt_parts.next().ok_or(JwtError::MissingPart("signature"))?;

        if jwt_parts.next().is_some() {
            return Err(JwtError::CouldNotDecode("too many token parts".to_owned()));
        }

        Ok(DecomposedToken {
            header: json_from_b64url(header)?,
            payload: json_from_b64url(payload)?,
            signing_input: format!("{header}.{payload}"),
            signature: b64url_to_bin(signature)?,
        })
    }
}
