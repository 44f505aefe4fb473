use serde_json::{json, Value};

use super::{error::JwtError, model::JwtHeader, Jwt};
use crate::credential_signer::MockSignatureProvider;

fn signature_provider() -> MockSignatureProvider {
    let mut provider = MockSignatureProvider::new();
    provider
        .expect_sign()
        .returning(|_| Ok(vec![1u8, 2, 3]));
    provider
}

#[tokio::test]
async fn test_tokenize_and_decompose() {
    let mut header = JwtHeader::new("ES256");
    header.signature_type = Some("vc+sd-jwt".to_owned());
    header.key_id = Some("key-1".to_owned());

    let jwt = Jwt::new(header.clone(), json!({ "vct": "urn:credential:por" }));

    let token = jwt.tokenize(&signature_provider()).await.unwrap();

    assert_eq!(3, token.split('.').count());
    assert!(token.ends_with(".AQID"));

    let decomposed = Jwt::<Value>::decompose_token(&token).unwrap();
    assert_eq!(header, decomposed.header);
    assert_eq!(json!({ "vct": "urn:credential:por" }), decomposed.payload);
    assert_eq!(vec![1u8, 2, 3], decomposed.signature);
    assert!(token.starts_with(&decomposed.signing_input));
}

#[test]
fn test_decompose_missing_signature() {
    let result = Jwt::<Value>::decompose_token("eyJhbGciOiJFUzI1NiJ9.e30");

    assert_eq!(Err(JwtError::MissingPart("signature")), result.map(|_| ()));
}

#[test]
fn test_decompose_rejects_garbage() {
    let result = Jwt::<Value>::decompose_token("not.a.jwt");

    assert!(matches!(result, Err(JwtError::CouldNotDecode(_))));
}

#[tokio::test]
async fn test_tokenize_propagates_signing_failure() {
    let mut provider = MockSignatureProvider::new();
    provider.expect_sign().returning(|_| {
        Err(oid4vc_crypto::SignerError::CouldNotSign(
            "hsm offline".to_owned(),
        ))
    });

    let jwt = Jwt::new(JwtHeader::new("ES256"), json!({}));

    let result = jwt.tokenize(&provider).await;

    assert!(matches!(result, Err(JwtError::CouldNotSign(_))));
}
