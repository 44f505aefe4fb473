use std::sync::Arc;

use ciborium::Value as CborValue;
use coset::{iana, CborSerializable, CoseSign1Builder, HeaderBuilder};
use ct_codecs::{Base64UrlSafeNoPadding, Encoder};
use oid4vc_crypto::imp::hasher::sha256::SHA256;
use oid4vc_crypto::imp::signer::es256::ES256Signer;
use oid4vc_crypto::imp::CryptoProviderImpl;
use oid4vc_crypto::{Hasher, Signer};
use serde_json::json;

use super::{MdocParser, Params};
use crate::common_models::ClaimFormat;
use crate::credential_parser::error::ParseError;
use crate::credential_parser::{CredentialParser, RawPresentation};

const DOC_TYPE: &str = "eu.europa.ec.eudi.pid.1";
const NAMESPACE: &str = "eu.europa.ec.eudi.pid.1";
const IMAGE_URI: &str = "https://verifier.example/images/mdoc.png";
const ISSUER_PRIVATE_KEY: [u8; 32] = [
    0xf2, 0xb0, 0x47, 0x4d, 0x08, 0x12, 0x8d, 0x58, 0x15, 0xb7, 0x86, 0x6d, 0x5c, 0xd1, 0x32,
    0xd6, 0x3e, 0xa7, 0x14, 0x8c, 0xf6, 0xa0, 0x06, 0x48, 0x08, 0xde, 0xe8, 0xa9, 0xa3, 0x84,
    0x98, 0xec,
];
const CERTIFICATE: [u8; 4] = [0x30, 0x82, 0x01, 0x00];

fn text(value: &str) -> CborValue {
    CborValue::Text(value.to_owned())
}

fn encode(value: &CborValue) -> Vec<u8> {
    let mut bytes = vec![];
    ciborium::into_writer(value, &mut bytes).unwrap();
    bytes
}

fn tag24(value: &CborValue) -> CborValue {
    CborValue::Tag(24, Box::new(CborValue::Bytes(encode(value))))
}

fn item(digest_id: i64, identifier: &str, value: CborValue) -> CborValue {
    tag24(&CborValue::Map(vec![
        (text("digestID"), CborValue::Integer(digest_id.into())),
        (text("random"), CborValue::Bytes(vec![7; 16])),
        (text("elementIdentifier"), text(identifier)),
        (text("elementValue"), value),
    ]))
}

fn items() -> Vec<CborValue> {
    vec![
        item(0, "family_name", text("Muller")),
        item(1, "given_name", text("Anna")),
        item(
            2,
            "birth_date",
            CborValue::Tag(1004, Box::new(text("1990-01-01"))),
        ),
        item(3, "age_over_18", CborValue::Bool(true)),
        item(4, "portrait", CborValue::Bytes(vec![0xff, 0xd8])),
    ]
}

fn mso(doc_type: &str, items: &[CborValue], valid_until: &str) -> CborValue {
    let digests = items
        .iter()
        .enumerate()
        .map(|(id, item)| {
            (
                CborValue::Integer((id as i64).into()),
                CborValue::Bytes(SHA256 {}.hash(&encode(item)).unwrap()),
            )
        })
        .collect();

    CborValue::Map(vec![
        (text("version"), text("1.0")),
        (text("digestAlgorithm"), text("SHA-256")),
        (
            text("valueDigests"),
            CborValue::Map(vec![(text(NAMESPACE), CborValue::Map(digests))]),
        ),
        (text("docType"), text(doc_type)),
        (
            text("validityInfo"),
            CborValue::Map(vec![
                (
                    text("signed"),
                    CborValue::Tag(0, Box::new(text("2024-01-01T00:00:00Z"))),
                ),
                (
                    text("validFrom"),
                    CborValue::Tag(0, Box::new(text("2024-01-01T00:00:00Z"))),
                ),
                (
                    text("validUntil"),
                    CborValue::Tag(0, Box::new(text(valid_until))),
                ),
            ]),
        ),
    ])
}

fn issuer_auth(mso: &CborValue) -> CborValue {
    let public_key = ES256Signer::public_key_from_private(&ISSUER_PRIVATE_KEY).unwrap();

    let sign1 = CoseSign1Builder::new()
        .protected(HeaderBuilder::new().algorithm(iana::Algorithm::ES256).build())
        .unprotected(
            HeaderBuilder::new()
                .key_id(b"issuer-key-1".to_vec())
                .value(
                    super::X5CHAIN,
                    coset::cbor::value::Value::Bytes(CERTIFICATE.to_vec()),
                )
                .build(),
        )
        .payload(encode(&tag24(mso)))
        .create_signature(&[], |data| {
            ES256Signer {}
                .sign(data, &public_key, &ISSUER_PRIVATE_KEY)
                .unwrap()
        })
        .build();

    ciborium::from_reader(sign1.to_vec().unwrap().as_slice()).unwrap()
}

fn device_response(doc_type: &str, items: Vec<CborValue>, issuer_auth: CborValue) -> String {
    let response = CborValue::Map(vec![
        (text("version"), text("1.0")),
        (
            text("documents"),
            CborValue::Array(vec![CborValue::Map(vec![
                (text("docType"), text(doc_type)),
                (
                    text("issuerSigned"),
                    CborValue::Map(vec![
                        (
                            text("nameSpaces"),
                            CborValue::Map(vec![(text(NAMESPACE), CborValue::Array(items))]),
                        ),
                        (text("issuerAuth"), issuer_auth),
                    ]),
                ),
            ])]),
        ),
        (text("status"), CborValue::Integer(0.into())),
    ]);

    Base64UrlSafeNoPadding::encode_to_string(encode(&response)).unwrap()
}

fn valid_presentation(doc_type: &str) -> String {
    let items = items();
    let auth = issuer_auth(&mso(doc_type, &items, "2049-01-01T00:00:00Z"));
    device_response(doc_type, items, auth)
}

fn parser() -> MdocParser {
    MdocParser::new(
        Arc::new(CryptoProviderImpl::default()),
        Params {
            doc_type: DOC_TYPE.to_owned(),
            namespace: NAMESPACE.to_owned(),
            image_uri: IMAGE_URI.to_owned(),
        },
    )
}

#[tokio::test]
async fn test_parse_device_response() {
    let parsed = parser()
        .parse(&valid_presentation(DOC_TYPE).into())
        .await
        .unwrap();

    assert_eq!(ClaimFormat::Mdoc, parsed.claims.format());
    assert_eq!(Some(NAMESPACE), parsed.claims.namespace());
    assert_eq!(Some(&json!("Muller")), parsed.claims.get("family_name"));
    assert_eq!(Some(&json!("1990-01-01")), parsed.claims.get("birth_date"));
    assert_eq!(Some(&json!(true)), parsed.claims.get("age_over_18"));
    assert_eq!(Some(&json!("_9g")), parsed.claims.get("portrait"));
    assert_eq!(
        json!("Anna"),
        parsed.claims.document()[NAMESPACE]["given_name"]
    );

    assert_eq!(IMAGE_URI, parsed.credential_image);
    assert_eq!(vec![CERTIFICATE.to_vec()], parsed.issuer.x5c);
    assert_eq!(Some("issuer-key-1".to_owned()), parsed.issuer.key_id);
    assert_eq!("ES256", parsed.issuer.algorithm);
    assert!(parsed.key_binding.is_none());

    ES256Signer {}
        .verify(
            &parsed.signed.signing_input,
            &parsed.signed.signature,
            &ES256Signer::public_key_from_private(&ISSUER_PRIVATE_KEY).unwrap(),
        )
        .unwrap();
}

#[tokio::test]
async fn test_parse_accepts_bytes_and_padding() {
    let presentation = format!("{}==", valid_presentation(DOC_TYPE));

    let parsed = parser()
        .parse(&RawPresentation::Bytes(presentation.into_bytes()))
        .await;

    assert!(parsed.is_ok());
}

#[tokio::test]
async fn test_parse_rejects_other_doc_type() {
    let result = parser()
        .parse(&valid_presentation("org.iso.18013.5.1.mDL").into())
        .await;

    assert_eq!(
        Err(ParseError::TypeMismatch("org.iso.18013.5.1.mDL".to_owned())),
        result
    );
}

#[tokio::test]
async fn test_parse_rejects_invalid_base64url() {
    let result = parser().parse(&"%%% not base64url %%%".into()).await;

    assert!(matches!(result, Err(ParseError::Decode(_))));
}

#[tokio::test]
async fn test_parse_rejects_non_mdoc_cbor() {
    for input in ["AAAA", "oA", "eyJhbGciOiJFUzI1NiJ9.e30.c2ln~"] {
        let result = parser().parse(&input.into()).await;

        assert!(result.is_err(), "{input} parsed");
    }
}

#[tokio::test]
async fn test_parse_rejects_tampered_item() {
    let signed_items = items();
    let auth = issuer_auth(&mso(DOC_TYPE, &signed_items, "2049-01-01T00:00:00Z"));

    let mut presented_items = signed_items;
    presented_items[0] = item(0, "family_name", text("Mustermann"));

    let result = parser()
        .parse(&device_response(DOC_TYPE, presented_items, auth).into())
        .await;

    assert_eq!(
        Err(ParseError::Integrity(
            "value digest mismatch for `family_name`".to_owned()
        )),
        result
    );
}

#[tokio::test]
async fn test_parse_rejects_expired_mso() {
    let items = items();
    let auth = issuer_auth(&mso(DOC_TYPE, &items, "2020-01-01T00:00:00Z"));

    let result = parser()
        .parse(&device_response(DOC_TYPE, items, auth).into())
        .await;

    assert_eq!(Err(ParseError::Integrity("MSO expired".to_owned())), result);
}

#[tokio::test]
async fn test_parse_requires_configured_namespace() {
    let parser = MdocParser::new(
        Arc::new(CryptoProviderImpl::default()),
        Params {
            doc_type: DOC_TYPE.to_owned(),
            namespace: "org.iso.18013.5.1".to_owned(),
            image_uri: IMAGE_URI.to_owned(),
        },
    );

    let result = parser.parse(&valid_presentation(DOC_TYPE).into()).await;

    assert!(matches!(result, Err(ParseError::Malformed(_))));
}
