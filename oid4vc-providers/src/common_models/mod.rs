use serde::{Deserialize, Serialize};

pub mod claims;


pub use claims::{CanonicalClaims, ClaimFormat};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kty")]
pub enum PublicKeyJwk {
    #[serde(rename = "EC")]
    Ec(PublicKeyJwkEllipticData),
    #[serde(rename = "OKP")]
    Okp(PublicKeyJwkEllipticData),
    #[serde(rename = "RSA")]
    Rsa(PublicKeyJwkRsaData),
    #[serde(rename = "oct")]
    Oct(PublicKeyJwkOctData),
}

impl PublicKeyJwk {
    pub fn key_id(&self) -> Option<&str> {
        match self {
            PublicKeyJwk::Ec(data) | PublicKeyJwk::Okp(data) => data.kid.as_deref(),
            PublicKeyJwk::Rsa(data) => data.kid.as_deref(),
            PublicKeyJwk::Oct(data) => data.kid.as_deref(),
        }
    }

    pub fn get_use(&self) -> Option<&str> {
        match self {
            PublicKeyJwk::Ec(data) | PublicKeyJwk::Okp(data) => data.r#use.as_deref(),
            PublicKeyJwk::Rsa(data) => data.r#use.as_deref(),
            PublicKeyJwk::Oct(data) => data.r#use.as_deref(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicKeyJwkEllipticData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    pub crv: String,
    pub x: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicKeyJwkRsaData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    pub e: String,
    pub n: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicKeyJwkOctData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    pub k: String,
}
