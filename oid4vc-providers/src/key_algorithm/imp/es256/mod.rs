use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use p256::elliptic_curve::sec1::{EncodedPoint, ToEncodedPoint};
use p256::elliptic_curve::generic_array::GenericArray;
use p256::pkcs8::DecodePublicKey;
use zeroize::Zeroizing;

use oid4vc_crypto::imp::signer::es256::ES256Signer;

use crate::common_models::{PublicKeyJwk, PublicKeyJwkEllipticData};
use crate::key_algorithm::{error::KeyAlgorithmError, KeyAlgorithm};

#[cfg(test)]
mod test;

const P256_CURVE: &str = "P-256";
const COORDINATE_LENGTH: usize = 32;

/// multicodec `p256-pub`, varint encoded
pub const P256_MULTICODEC: [u8; 2] = [0x80, 0x24];

pub struct Es256;

fn decode_coordinate(value: &str) -> Result<Vec<u8>, KeyAlgorithmError> {
    let decoded = Base64UrlSafeNoPadding::decode_to_vec(value, None)
        .map_err(|e| KeyAlgorithmError::Failed(e.to_string()))?;

    if decoded.len() != COORDINATE_LENGTH {
        return Err(KeyAlgorithmError::Failed(format!(
            "invalid coordinate length {}",
            decoded.len()
        )));
    }

    Ok(decoded)
}

impl KeyAlgorithm for Es256 {
    fn get_signer_algorithm_id(&self) -> String {
        "ES256".to_string()
    }

    fn get_multibase(&self, public_key: &[u8]) -> Result<String, KeyAlgorithmError> {
        let key = ES256Signer::to_bytes(public_key)?;
        let data = [P256_MULTICODEC.as_slice(), key.as_slice()].concat();
        Ok(format!("z{}", bs58::encode(data).into_string()))
    }

    fn bytes_to_jwk(
        &self,
        bytes: &[u8],
        r#use: Option<String>,
    ) -> Result<PublicKeyJwk, KeyAlgorithmError> {
        let pk = p256::PublicKey::from_sec1_bytes(bytes)
            .map_err(|e| KeyAlgorithmError::Failed(e.to_string()))?;
        let encoded_point = pk.to_encoded_point(false);
        let x = encoded_point
            .x()
            .ok_or(KeyAlgorithmError::Failed("X is missing".to_string()))?;
        let y = encoded_point
            .y()
            .ok_or(KeyAlgorithmError::Failed("Y is missing".to_string()))?;
        Ok(PublicKeyJwk::Ec(PublicKeyJwkEllipticData {
            r#use,
            kid: None,
            crv: P256_CURVE.to_string(),
            x: Base64UrlSafeNoPadding::encode_to_string(x)
                .map_err(|e| KeyAlgorithmError::Failed(e.to_string()))?,
            y: Some(
                Base64UrlSafeNoPadding::encode_to_string(y)
                    .map_err(|e| KeyAlgorithmError::Failed(e.to_string()))?,
            ),
        }))
    }

    fn jwk_to_bytes(&self, jwk: &PublicKeyJwk) -> Result<Vec<u8>, KeyAlgorithmError> {
        let PublicKeyJwk::Ec(data) = jwk else {
            return Err(KeyAlgorithmError::Failed("invalid kty".to_string()));
        };

        if data.crv != P256_CURVE {
            return Err(KeyAlgorithmError::Failed(format!(
                "unsupported curve `{}`",
                data.crv
            )));
        }

        let x = decode_coordinate(&data.x)?;
        let y = decode_coordinate(
            data.y
                .as_ref()
                .ok_or(KeyAlgorithmError::Failed("Y is missing".to_string()))?,
        )?;

        let encoded_point = EncodedPoint::<p256::NistP256>::from_affine_coordinates(
            GenericArray::from_slice(&x),
            GenericArray::from_slice(&y),
            false,
        );

        // rejects coordinates that are not on the curve
        let public_key = p256::PublicKey::from_sec1_bytes(encoded_point.as_bytes())
            .map_err(|e| KeyAlgorithmError::Failed(e.to_string()))?;

        Ok(public_key.to_encoded_point(true).as_bytes().to_owned())
    }

    fn public_key_from_der(&self, public_key_der: &[u8]) -> Result<Vec<u8>, KeyAlgorithmError> {
        let pk = p256::PublicKey::from_public_key_der(public_key_der)
            .map_err(|e| KeyAlgorithmError::Failed(e.to_string()))?;

        Ok(pk.to_encoded_point(true).to_bytes().into())
    }

    fn private_key_from_jwk(&self, jwk: &str) -> Result<Zeroizing<Vec<u8>>, KeyAlgorithmError> {
        let secret_key = p256::SecretKey::from_jwk_str(jwk).map_err(|err| {
            KeyAlgorithmError::Failed(format!("Failed parsing private JWK: {err}"))
        })?;

        Ok(Zeroizing::new(secret_key.to_bytes().to_vec()))
    }
}
