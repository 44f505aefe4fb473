use oid4vc_crypto::imp::signer::es256::ES256Signer;

use super::*;

fn jwk() -> PublicKeyJwk {
    PublicKeyJwk::Ec(PublicKeyJwkEllipticData {
        r#use: None,
        kid: None,
        crv: "P-256".to_owned(),
        x: "CQKO9r8IF7mEYhZImiOoLqw70WYLAohqT3JkomZW3x4".to_owned(),
        y: Some("khCene-e-_GAeE8N-aWUUucY_dVGRGCqpQmVhPwDHUM".to_owned()),
    })
}

#[test]
fn test_jwk_to_bytes() {
    assert_eq!(
        vec![
            3, 9, 2, 142, 246, 191, 8, 23, 185, 132, 98, 22, 72, 154, 35, 168, 46, 172, 59, 209,
            102, 11, 2, 136, 106, 79, 114, 100, 162, 102, 86, 223, 30
        ],
        Es256.jwk_to_bytes(&jwk()).unwrap()
    )
}

#[test]
fn test_bytes_to_jwk_is_inverse() {
    let bytes = Es256.jwk_to_bytes(&jwk()).unwrap();

    assert_eq!(jwk(), Es256.bytes_to_jwk(&bytes, None).unwrap());
}

#[test]
fn test_jwk_to_bytes_rejects_other_curve() {
    let PublicKeyJwk::Ec(mut data) = jwk() else {
        unreachable!()
    };
    data.crv = "P-384".to_owned();

    assert!(Es256.jwk_to_bytes(&PublicKeyJwk::Ec(data)).is_err());
}

#[test]
fn test_jwk_to_bytes_rejects_truncated_coordinate() {
    let PublicKeyJwk::Ec(mut data) = jwk() else {
        unreachable!()
    };
    data.x = "CQKO9r8IF7mEYhZI".to_owned();

    assert!(Es256.jwk_to_bytes(&PublicKeyJwk::Ec(data)).is_err());
}

#[test]
fn test_multibase_prefix() {
    let bytes = Es256.jwk_to_bytes(&jwk()).unwrap();

    let multibase = Es256.get_multibase(&bytes).unwrap();

    assert!(multibase.starts_with("zDn"));
}

#[test]
fn test_private_key_from_jwk() {
    let (private_key, public_key) = ES256Signer::random();
    let secret = p256::SecretKey::from_slice(&private_key).unwrap();
    let jwk = secret.to_jwk_string();

    let parsed = Es256.private_key_from_jwk(&jwk).unwrap();

    assert_eq!(private_key.as_slice(), parsed.as_slice());
    assert_eq!(
        public_key,
        ES256Signer::public_key_from_private(&parsed).unwrap()
    );
}
