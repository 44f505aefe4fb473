use std::collections::HashMap;
use std::sync::Arc;

use oid4vc_crypto::imp::hasher::sha256::SHA256;
use oid4vc_crypto::imp::signer::es256::ES256Signer;
use oid4vc_crypto::imp::CryptoProviderImpl;
use oid4vc_crypto::{Hasher, Signer};
use serde_json::{json, Map, Value};

use super::SdJwtCredentialSigner;
use crate::credential_signer::error::SigningError;
use crate::credential_signer::imp::internal::InternalSignatureProvider;
use crate::credential_signer::model::{
    CredentialHeader, CredentialTyp, DisclosureFrame, TypeMetadataEmbedding,
};
use crate::credential_signer::{CredentialSigner, MockSignatureProvider, SignatureProvider};
use crate::jwt::mapper::{b64url_to_bin, json_from_b64url};
use crate::jwt::Jwt;
use crate::key_algorithm::imp::{es256::Es256, provider::KeyAlgorithmProviderImpl};
use crate::key_algorithm::KeyAlgorithm;

const ISSUER_JWK: &str = r#"{
    "kty": "EC",
    "crv": "P-256",
    "kid": "issuer-key-1",
    "d": "8rBHTQgSjVgVt4ZtXNEy1j6nFIz2oAZICN7oqaOEmOw",
    "x": "8C2p-zOcmEOfoULFnoTVzulQSR0z9kGApcFV-xFGZu8",
    "y": "l00cqxQjbbEKV2fEa7mim-4yOl2lADlhOxKn3Rmpf9Y"
}"#;

fn signature_provider() -> Arc<InternalSignatureProvider> {
    let key_algorithm_provider = KeyAlgorithmProviderImpl::new(
        HashMap::from([("ES256".to_owned(), Arc::new(Es256) as Arc<dyn KeyAlgorithm>)]),
        Arc::new(CryptoProviderImpl::default()),
    );

    Arc::new(
        InternalSignatureProvider::from_private_jwk(
            &key_algorithm_provider,
            "ES256",
            ISSUER_JWK,
            None,
        )
        .unwrap(),
    )
}

fn signer() -> SdJwtCredentialSigner {
    SdJwtCredentialSigner::new(
        Arc::new(CryptoProviderImpl::default()),
        signature_provider(),
    )
}

fn payload() -> Map<String, Value> {
    let Value::Object(payload) = json!({
        "cnf": {
            "jwk": {
                "kty": "EC",
                "crv": "P-256",
                "x": "CQKO9r8IF7mEYhZImiOoLqw70WYLAohqT3JkomZW3x4",
                "y": "khCene-e-_GAeE8N-aWUUucY_dVGRGCqpQmVhPwDHUM"
            }
        },
        "vct": "urn:credential:por",
        "jti": "urn:credential:por:1",
        "legal_name": "Acme Corp",
        "legal_person_identifier": "LPI-001",
        "full_powers": "true",
        "address": {
            "street": "Main Street 1",
            "locality": "Athens"
        }
    }) else {
        unreachable!()
    };
    payload
}

fn frame(entries: &[&str], payload: &Map<String, Value>) -> DisclosureFrame {
    DisclosureFrame::new(
        entries.iter().map(|entry| (entry.to_string(), true)),
        payload,
    )
    .unwrap()
}

fn split(credential: &str) -> (String, Vec<String>) {
    let mut parts = credential.split('~');
    let jwt = parts.next().unwrap().to_owned();
    let disclosures = parts
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    (jwt, disclosures)
}

#[tokio::test]
async fn test_sign_blinds_framed_claim() {
    let payload = payload();
    let frame = frame(&["legal_name"], &payload);

    let issued = signer()
        .sign(payload, CredentialHeader::new(CredentialTyp::VcSdJwt), &frame)
        .await
        .unwrap();

    assert_eq!("vc+sd-jwt", issued.format);
    assert!(issued.credential.ends_with('~'));

    let (jwt, disclosures) = split(&issued.credential);
    assert_eq!(1, disclosures.len());

    let decomposed = Jwt::<Value>::decompose_token(&jwt).unwrap();
    assert_eq!("ES256", decomposed.header.algorithm);
    assert_eq!(Some("vc+sd-jwt".to_owned()), decomposed.header.signature_type);
    assert_eq!(Some("issuer-key-1".to_owned()), decomposed.header.key_id);

    let claims = decomposed.payload;
    assert!(claims.get("legal_name").is_none());
    assert_eq!(json!("sha-256"), claims["_sd_alg"]);
    assert_eq!(json!("urn:credential:por"), claims["vct"]);
    assert_eq!(json!("LPI-001"), claims["legal_person_identifier"]);
    assert!(claims["cnf"]["jwk"].is_object());

    let digest = SHA256 {}.hash_base64(disclosures[0].as_bytes()).unwrap();
    assert_eq!(json!([digest]), claims["_sd"]);

    let disclosure: Value = json_from_b64url(&disclosures[0]).unwrap();
    assert_eq!(json!("legal_name"), disclosure[1]);
    assert_eq!(json!("Acme Corp"), disclosure[2]);
    assert_eq!(22, disclosure[0].as_str().unwrap().len());

    ES256Signer {}
        .verify(
            decomposed.signing_input.as_bytes(),
            &decomposed.signature,
            &signature_provider().get_public_key(),
        )
        .unwrap();
}

#[tokio::test]
async fn test_sign_nested_claims_blinded_inside_out() {
    let payload = payload();
    let frame = frame(&["address", "address.street", "full_powers"], &payload);

    let issued = signer()
        .sign(payload, CredentialHeader::new(CredentialTyp::Jwt), &frame)
        .await
        .unwrap();

    let (jwt, disclosures) = split(&issued.credential);
    assert_eq!(3, disclosures.len());

    let first: Value = json_from_b64url(&disclosures[0]).unwrap();
    assert_eq!(json!("street"), first[1]);

    let address: Value = disclosures
        .iter()
        .map(|d| json_from_b64url::<Value>(d).unwrap())
        .find(|d| d[1] == json!("address"))
        .unwrap();
    assert_eq!(json!("Athens"), address[2]["locality"]);
    assert!(address[2].get("street").is_none());
    assert_eq!(
        json!([SHA256 {}.hash_base64(disclosures[0].as_bytes()).unwrap()]),
        address[2]["_sd"]
    );

    let claims = Jwt::<Value>::decompose_token(&jwt).unwrap().payload;
    let digests = claims["_sd"].as_array().unwrap();
    assert_eq!(2, digests.len());
    let mut sorted = digests.clone();
    sorted.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
    assert_eq!(&sorted, digests);
}

#[tokio::test]
async fn test_sign_type_metadata_embedding_follows_typ() {
    let metadata = json!({ "vct": "urn:credential:por", "name": "Power of Representation" });

    for (typ, expected) in [
        (CredentialTyp::Jwt, metadata.clone()),
        (
            CredentialTyp::DcSdJwt,
            TypeMetadataEmbedding::EncodedArray.embed(&metadata).unwrap(),
        ),
    ] {
        let payload = payload();
        let frame = frame(&["legal_name"], &payload);

        let issued = signer()
            .sign(
                payload,
                CredentialHeader::new(typ).with_type_metadata(metadata.clone()),
                &frame,
            )
            .await
            .unwrap();

        let (jwt, _) = split(&issued.credential);
        let header = Jwt::<Value>::decompose_token(&jwt).unwrap().header;
        assert_eq!(Some(expected), header.vctm);
        assert_eq!(typ.format(), issued.format);
    }
}

#[test]
fn test_encoded_array_embedding_decodes_back() {
    let metadata = json!({ "vct": "urn:credential:por" });

    let embedded = TypeMetadataEmbedding::EncodedArray.embed(&metadata).unwrap();

    let encoded = embedded[0].as_str().unwrap();
    let decoded: Value = serde_json::from_slice(&b64url_to_bin(encoded).unwrap()).unwrap();
    assert_eq!(metadata, decoded);
}

#[tokio::test]
async fn test_sign_requires_holder_key() {
    let mut payload = payload();
    payload.remove("cnf");
    let frame = frame(&["legal_name"], &payload);

    let mut signature_provider = MockSignatureProvider::new();
    signature_provider.expect_sign().never();

    let signer = SdJwtCredentialSigner::new(
        Arc::new(CryptoProviderImpl::default()),
        Arc::new(signature_provider),
    );

    let result = signer
        .sign(payload, CredentialHeader::new(CredentialTyp::Jwt), &frame)
        .await;

    assert_eq!(Err(SigningError::MissingHolderKey), result);
}

#[tokio::test]
async fn test_sign_rejects_frame_built_for_another_payload() {
    let frame = frame(&["legal_name"], &payload());
    let mut payload = payload();
    payload.remove("legal_name");

    let mut signature_provider = MockSignatureProvider::new();
    signature_provider.expect_sign().never();

    let signer = SdJwtCredentialSigner::new(
        Arc::new(CryptoProviderImpl::default()),
        Arc::new(signature_provider),
    );

    let result = signer
        .sign(payload, CredentialHeader::new(CredentialTyp::Jwt), &frame)
        .await;

    assert_eq!(
        Err(SigningError::UnknownDisclosureFrameKey("legal_name".to_owned())),
        result
    );
}

#[tokio::test]
async fn test_sign_header_key_id_override() {
    let payload = payload();
    let frame = frame(&[], &payload);

    let issued = signer()
        .sign(
            payload,
            CredentialHeader::new(CredentialTyp::Jwt).with_key_id("did:example:issuer#0"),
            &frame,
        )
        .await
        .unwrap();

    let (jwt, disclosures) = split(&issued.credential);
    assert!(disclosures.is_empty());
    assert!(issued.credential.ends_with("~"));

    let decomposed = Jwt::<Value>::decompose_token(&jwt).unwrap();
    assert_eq!(Some("did:example:issuer#0".to_owned()), decomposed.header.key_id);
    assert_eq!(Some("JWT".to_owned()), decomposed.header.signature_type);
    assert!(decomposed.payload.get("_sd").is_none());
}

#[test]
fn test_internal_signature_provider_rejects_public_jwk() {
    let key_algorithm_provider = KeyAlgorithmProviderImpl::new(
        HashMap::from([("ES256".to_owned(), Arc::new(Es256) as Arc<dyn KeyAlgorithm>)]),
        Arc::new(CryptoProviderImpl::default()),
    );

    let public_only = r#"{
        "kty": "EC",
        "crv": "P-256",
        "x": "8C2p-zOcmEOfoULFnoTVzulQSR0z9kGApcFV-xFGZu8",
        "y": "l00cqxQjbbEKV2fEa7mim-4yOl2lADlhOxKn3Rmpf9Y"
    }"#;

    let result = InternalSignatureProvider::from_private_jwk(
        &key_algorithm_provider,
        "ES256",
        public_only,
        None,
    );

    assert!(matches!(result, Err(SigningError::InvalidIssuerKey(_))));
}
