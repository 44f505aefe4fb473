use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common_models::PublicKeyJwk;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtHeader {
    #[serde(rename = "alg")]
    pub algorithm: String,

    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    #[serde(rename = "typ", default, skip_serializing_if = "Option::is_none")]
    pub signature_type: Option<String>,

    /// base64 (not url-safe) DER certificates, leaf first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5c: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwk: Option<PublicKeyJwk>,

    /// SD-JWT VC type metadata, inline object or array of base64url documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vctm: Option<Value>,
}

impl JwtHeader {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            key_id: None,
            signature_type: None,
            x5c: None,
            jwk: None,
            vctm: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecomposedToken<Payload> {
    pub header: JwtHeader,
    pub payload: Payload,
    /// `<header>.<payload>` exactly as received
    pub signing_input: String,
    pub signature: Vec<u8>,
}
