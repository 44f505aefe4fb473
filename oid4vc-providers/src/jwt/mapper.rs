use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use serde::de::DeserializeOwned;

use super::error::JwtError;

pub fn bin_to_b64url_string(bin: &[u8]) -> Result<String, JwtError> {
    Base64UrlSafeNoPadding::encode_to_string(bin)
        .map_err(|e| JwtError::CouldNotFormat(e.to_string()))
}

pub fn string_to_b64url_string(string: &str) -> Result<String, JwtError> {
    Base64UrlSafeNoPadding::encode_to_string(string)
        .map_err(|e| JwtError::CouldNotFormat(e.to_string()))
}

pub fn b64url_to_bin(value: &str) -> Result<Vec<u8>, JwtError> {
    Base64UrlSafeNoPadding::decode_to_vec(value, None)
        .map_err(|e| JwtError::CouldNotDecode(e.to_string()))
}

pub fn json_from_b64url<T: DeserializeOwned>(value: &str) -> Result<T, JwtError> {
    let decoded = b64url_to_bin(value)?;
    serde_json::from_slice(&decoded).map_err(|e| JwtError::CouldNotDecode(e.to_string()))
}
