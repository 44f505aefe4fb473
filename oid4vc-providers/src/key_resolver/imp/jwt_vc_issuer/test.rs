use std::collections::HashMap;
use std::sync::Arc;

use oid4vc_crypto::imp::CryptoProviderImpl;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{well_known_url, JwtVcIssuerMetadataResolver, Params};
use crate::http_client::imp::reqwest_client::ReqwestClient;
use crate::key_algorithm::imp::{es256::Es256, provider::KeyAlgorithmProviderImpl};
use crate::key_algorithm::KeyAlgorithm;
use crate::key_resolver::{error::ResolverError, IssuerMetadata, PublicKeyResolver, ResolverKind};

fn resolver(trusted_issuer: &str) -> JwtVcIssuerMetadataResolver {
    JwtVcIssuerMetadataResolver::new(
        Arc::new(ReqwestClient::default()),
        Arc::new(KeyAlgorithmProviderImpl::new(
            HashMap::from([("ES256".to_owned(), Arc::new(Es256) as Arc<dyn KeyAlgorithm>)]),
            Arc::new(CryptoProviderImpl::default()),
        )),
        Params::default(),
        vec![trusted_issuer.to_owned()],
    )
}

fn jwk(kid: &str) -> serde_json::Value {
    json!({
        "kty": "EC",
        "crv": "P-256",
        "kid": kid,
        "x": "CQKO9r8IF7mEYhZImiOoLqw70WYLAohqT3JkomZW3x4",
        "y": "khCene-e-_GAeE8N-aWUUucY_dVGRGCqpQmVhPwDHUM"
    })
}

fn issuer(iss: &str, kid: Option<&str>) -> IssuerMetadata {
    IssuerMetadata {
        issuer: Some(iss.to_owned()),
        key_id: kid.map(ToOwned::to_owned),
        algorithm: "ES256".to_owned(),
        x5c: vec![],
    }
}

#[test]
fn test_well_known_url() {
    assert_eq!(
        "https://issuer.example/.well-known/jwt-vc-issuer",
        well_known_url("https://issuer.example").unwrap().as_str()
    );
    assert_eq!(
        "https://issuer.example/.well-known/jwt-vc-issuer/tenant/1234",
        well_known_url("https://issuer.example/tenant/1234/").unwrap().as_str()
    );
    assert!(matches!(
        well_known_url("did:web:issuer.example"),
        Err(ResolverError::NotApplicable(_))
    ));
}

#[tokio::test]
async fn test_resolve_inline_jwks() {
    let mock_server = MockServer::start().await;
    let iss = format!("{}/tenant", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/.well-known/jwt-vc-issuer/tenant"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": iss,
            "jwks": { "keys": [ jwk("key-0"), jwk("key-1") ] }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let key = resolver(&iss)
        .resolve(&issuer(&iss, Some("key-1")))
        .await
        .unwrap();

    assert_eq!(ResolverKind::JwtVcIssuerMetadata, key.source);
    assert_eq!(33, key.public_key.len());
}

#[tokio::test]
async fn test_resolve_jwks_uri() {
    let mock_server = MockServer::start().await;
    let iss = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/.well-known/jwt-vc-issuer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": iss,
            "jwks_uri": format!("{iss}/jwks.json")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jwks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [ jwk("only") ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let key = resolver(&iss).resolve(&issuer(&iss, None)).await;

    assert!(key.is_ok());
}

#[tokio::test]
async fn test_resolve_rejects_issuer_mismatch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/.well-known/jwt-vc-issuer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": "https://attacker.example",
            "jwks": { "keys": [ jwk("key-0") ] }
        })))
        .mount(&mock_server)
        .await;

    let iss = mock_server.uri();
    let result = resolver(&iss).resolve(&issuer(&iss, None)).await;

    assert!(matches!(result, Err(ResolverError::KeyNotFound(_))));
}

#[tokio::test]
async fn test_resolve_unknown_kid() {
    let mock_server = MockServer::start().await;
    let iss = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/.well-known/jwt-vc-issuer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": iss,
            "jwks": { "keys": [ jwk("key-0") ] }
        })))
        .mount(&mock_server)
        .await;

    let result = resolver(&iss).resolve(&issuer(&iss, Some("key-9"))).await;

    assert!(matches!(result, Err(ResolverError::KeyNotFound(_))));
}

#[tokio::test]
async fn test_resolve_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let iss = mock_server.uri();
    let result = resolver(&iss).resolve(&issuer(&iss, None)).await;

    assert!(matches!(result, Err(ResolverError::Http(_))));
}

#[tokio::test]
async fn test_resolve_untrusted_issuer_is_never_fetched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = resolver("https://issuer.example")
        .resolve(&issuer(&mock_server.uri(), None))
        .await;

    assert!(matches!(result, Err(ResolverError::UntrustedIssuer(_))));
}

#[tokio::test]
async fn test_resolve_rejects_foreign_jwks_uri() {
    let mock_server = MockServer::start().await;
    let iss = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/.well-known/jwt-vc-issuer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": iss,
            "jwks_uri": "https://attacker.example/jwks.json"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = resolver(&iss).resolve(&issuer(&iss, None)).await;

    assert!(matches!(result, Err(ResolverError::UntrustedIssuer(_))));
}
