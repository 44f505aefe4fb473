use std::sync::Arc;

use maplit::hashmap;
use oid4vc_core::config::{CoreConfig, VerifierConfig};
use oid4vc_core::service::error::VerificationError;
use oid4vc_core::Oid4vcCore;
use oid4vc_crypto::imp::CryptoProviderImpl;
use oid4vc_providers::credential_parser::RawPresentation;
use oid4vc_providers::credential_signer::imp::internal::InternalSignatureProvider;
use oid4vc_providers::credential_signer::imp::sd_jwt::SdJwtCredentialSigner;
use oid4vc_providers::credential_signer::model::{CredentialHeader, CredentialTyp, DisclosureFrame};
use oid4vc_providers::credential_signer::CredentialSigner;
use oid4vc_providers::http_client::imp::reqwest_client::ReqwestClient;
use oid4vc_providers::identity_store::imp::in_memory::InMemoryIdentityStore;
use oid4vc_providers::image_renderer::TemplateSource;
use oid4vc_providers::key_algorithm::imp::{es256::Es256, provider::KeyAlgorithmProviderImpl};
use oid4vc_providers::key_algorithm::KeyAlgorithm;
use oid4vc_providers::key_resolver::ResolverKind;
use oid4vc_providers::presentation_definition::model::PresentationDefinition;
use serde_json::json;

const PID_VCT: &str = "urn:eu.europa.ec.eudi:pid:1";

/// Key of a party nobody configured as an issuer.
const SELF_ISSUED_JWK: &str = r#"{
    "kty": "EC",
    "crv": "P-256",
    "x": "ZYSqXgoOEhZH6Xsbwux6oh2k45mx_UsiuB3J0SbqTSc",
    "y": "FfAjzVqGLYG-GcEQIsh2ZC4utNBITcx2MykJdmbNW3s",
    "d": "4_qFFhztce2wo4WJ5x1aDGI22C-JYfHg9Lf1Mv0-B-U"
}"#;
const SELF_ISSUED_DID: &str = "did:jwk:eyJrdHkiOiJFQyIsImNydiI6IlAtMjU2IiwieCI6IlpZU3FYZ29PRWhaSDZYc2J3dXg2b2gyazQ1bXhfVXNpdUIzSjBTYnFUU2MiLCJ5IjoiRmZBanpWcUdMWUctR2NFUUlzaDJaQzR1dE5CSVRjeDJNeWtKZG1iTlczcyJ9";

fn pid_definition() -> PresentationDefinition {
    serde_json::from_value(json!({
        "id": "vid",
        "input_descriptors": [{
            "id": "VID",
            "constraints": {
                "fields": [
                    {
                        "name": "Credential type",
                        "path": ["$.vct"],
                        "filter": { "type": "string", "const": PID_VCT }
                    },
                    { "name": "Given Name", "path": ["$.given_name"], "filter": {} },
                    { "name": "Family Name", "path": ["$.family_name"], "filter": {} },
                    { "name": "Birthdate", "path": ["$.birthdate"], "filter": {} }
                ]
            }
        }]
    }))
    .unwrap()
}

fn core(verifier: VerifierConfig) -> Oid4vcCore {
    let config = CoreConfig {
        verifier: VerifierConfig {
            accepted_vcts: vec![PID_VCT.to_owned()],
            default_svg_template: Some(TemplateSource::Inline {
                svg: "<svg>{{given_name}}</svg>".to_owned(),
            }),
            ..verifier
        },
        presentation_definitions: vec![pid_definition()],
        ..Default::default()
    };

    Oid4vcCore::new(
        Some(config),
        Arc::new(ReqwestClient::default()),
        Arc::new(InMemoryIdentityStore::new(vec![], vec![])),
    )
    .unwrap()
}

/// PID signed with [`SELF_ISSUED_JWK`], naming its own key in `kid`.
async fn self_issued_pid(iss: &str) -> RawPresentation {
    let key_algorithm_provider = KeyAlgorithmProviderImpl::new(
        hashmap! { "ES256".to_owned() => Arc::new(Es256) as Arc<dyn KeyAlgorithm> },
        Arc::new(CryptoProviderImpl::default()),
    );
    let signature_provider = InternalSignatureProvider::from_private_jwk(
        &key_algorithm_provider,
        "ES256",
        SELF_ISSUED_JWK,
        Some(format!("{SELF_ISSUED_DID}#0")),
    )
    .unwrap();
    let signer = SdJwtCredentialSigner::new(
        Arc::new(CryptoProviderImpl::default()),
        Arc::new(signature_provider),
    );

    let serde_json::Value::Object(payload) = json!({
        "cnf": { "jwk": {
            "kty": "EC",
            "crv": "P-256",
            "x": "CQKO9r8IF7mEYhZImiOoLqw70WYLAohqT3JkomZW3x4",
            "y": "khCene-e-_GAeE8N-aWUUucY_dVGRGCqpQmVhPwDHUM"
        }},
        "vct": PID_VCT,
        "iss": iss,
        "given_name": "John",
        "family_name": "Doe",
        "birthdate": "1990-01-01",
    }) else {
        unreachable!()
    };
    let frame = DisclosureFrame::new(
        ["given_name", "family_name", "birthdate"].map(|name| (name.to_owned(), true)),
        &payload,
    )
    .unwrap();

    let issued = signer
        .sign(payload, CredentialHeader::new(CredentialTyp::VcSdJwt), &frame)
        .await
        .unwrap();

    RawPresentation::from(issued.credential)
}

#[test]
fn test_default_resolvers_only_use_configured_anchors() {
    assert_eq!(
        VerifierConfig::default().resolver_order,
        vec![ResolverKind::StaticKey, ResolverKind::X5c]
    );
}

#[tokio::test]
async fn test_self_issued_pid_rejected_with_default_config() {
    let core = core(VerifierConfig::default());

    let result = core
        .verification_service
        .verify(&self_issued_pid("https://issuer.example").await, "vid")
        .await;

    assert!(matches!(result, Err(VerificationError::KeyResolution(_))));
}

#[tokio::test]
async fn test_did_issuer_must_be_trusted() {
    let core = core(VerifierConfig {
        resolver_order: vec![ResolverKind::Did],
        ..Default::default()
    });

    let result = core
        .verification_service
        .verify(&self_issued_pid(SELF_ISSUED_DID).await, "vid")
        .await;

    assert!(matches!(result, Err(VerificationError::KeyResolution(_))));
}

#[tokio::test]
async fn test_did_kid_does_not_stand_in_for_url_issuer() {
    let core = core(VerifierConfig {
        resolver_order: vec![ResolverKind::Did],
        trusted_issuers: vec![SELF_ISSUED_DID.to_owned(), "https://issuer.example".to_owned()],
        ..Default::default()
    });

    let result = core
        .verification_service
        .verify(&self_issued_pid("https://issuer.example").await, "vid")
        .await;

    assert!(matches!(result, Err(VerificationError::KeyResolution(_))));
}

#[tokio::test]
async fn test_trusted_did_issuer_accepted() {
    let core = core(VerifierConfig {
        resolver_order: vec![ResolverKind::Did],
        trusted_issuers: vec![SELF_ISSUED_DID.to_owned()],
        ..Default::default()
    });

    let outcome = core
        .verification_service
        .verify(&self_issued_pid(SELF_ISSUED_DID).await, "vid")
        .await
        .unwrap();

    assert!(outcome.accepted);
}
