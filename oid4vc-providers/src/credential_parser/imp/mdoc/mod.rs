//! ISO/IEC 18013-5 mdoc presentations: base64url encoded CBOR `DeviceResponse`.

use std::collections::HashMap;
use std::sync::Arc;

use ciborium::Value as CborValue;
use coset::{iana, CborSerializable, CoseSign1, Label, RegisteredLabelWithPrivate};
use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use oid4vc_crypto::imp::SHA_256;
use oid4vc_crypto::CryptoProvider;
use serde::Deserialize;
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::common_models::CanonicalClaims;
use crate::credential_parser::error::ParseError;
use crate::credential_parser::{
    CredentialParser, ParseResult, ParsedCredential, RawPresentation, SignedContent,
};
use crate::key_resolver::IssuerMetadata;

#[cfg(test)]
mod test;

/// COSE header label of the certificate chain
pub const X5CHAIN: i64 = 33;

const EMBEDDED_CBOR_TAG: u64 = 24;
const COSE_SIGN1_TAG: u64 = 18;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    pub doc_type: String,
    pub namespace: String,
    /// static image shown for every mdoc credential
    pub image_uri: String,
}

pub struct MdocParser {
    crypto: Arc<dyn CryptoProvider>,
    params: Params,
}

impl MdocParser {
    pub fn new(crypto: Arc<dyn CryptoProvider>, params: Params) -> Self {
        Self { crypto, params }
    }

    fn namespace_claims(
        &self,
        items: &[CborValue],
        value_digests: &HashMap<i64, Vec<u8>>,
    ) -> Result<Map<String, Value>, ParseError> {
        let hasher = self
            .crypto
            .get_hasher(SHA_256)
            .map_err(|e| ParseError::Integrity(e.to_string()))?;

        let mut claims = Map::with_capacity(items.len());
        for item in items {
            let item_bytes = embedded_cbor(item)
                .ok_or_else(|| ParseError::Malformed("item is not tag 24".to_owned()))?;
            let signed_item: CborValue = decode(item_bytes)?;

            let identifier = map_get(&signed_item, "elementIdentifier")
                .and_then(CborValue::as_text)
                .ok_or_else(|| ParseError::Malformed("missing elementIdentifier".to_owned()))?;

            let digest_id = map_get(&signed_item, "digestID")
                .and_then(CborValue::as_integer)
                .and_then(|id| i64::try_from(id).ok())
                .ok_or_else(|| {
                    ParseError::Malformed(format!("missing digestID of `{identifier}`"))
                })?;

            let digest = hasher
                .hash(&encode(item)?)
                .map_err(|e| ParseError::Integrity(e.to_string()))?;

            if value_digests.get(&digest_id) != Some(&digest) {
                return Err(ParseError::Integrity(format!(
                    "value digest mismatch for `{identifier}`"
                )));
            }

            let value = map_get(&signed_item, "elementValue")
                .ok_or_else(|| ParseError::Malformed(format!("missing value of `{identifier}`")))?;

            claims.insert(identifier.to_owned(), cbor_to_json(value)?);
        }

        Ok(claims)
    }
}

#[async_trait::async_trait]
impl CredentialParser for MdocParser {
    async fn parse(&self, raw: &RawPresentation) -> ParseResult {
        let text = raw.as_text()?;
        let bytes = Base64UrlSafeNoPadding::decode_to_vec(text.trim_end_matches('='), None)
            .map_err(|e| ParseError::Decode(e.to_string()))?;

        let response: CborValue = decode(&bytes)?;
        let document = first_document(&response)?;

        let doc_type = map_get(document, "docType")
            .and_then(CborValue::as_text)
            .ok_or_else(|| ParseError::Malformed("missing docType".to_owned()))?;

        if doc_type != self.params.doc_type {
            return Err(ParseError::TypeMismatch(doc_type.to_owned()));
        }

        let issuer_signed = map_get(document, "issuerSigned")
            .ok_or_else(|| ParseError::Malformed("missing issuerSigned".to_owned()))?;

        let items = map_get(issuer_signed, "nameSpaces")
            .and_then(|namespaces| map_get(namespaces, &self.params.namespace))
            .and_then(CborValue::as_array)
            .ok_or_else(|| {
                ParseError::Malformed(format!("namespace `{}` not present", self.params.namespace))
            })?;

        let issuer_auth = map_get(issuer_signed, "issuerAuth")
            .ok_or_else(|| ParseError::Malformed("missing issuerAuth".to_owned()))?;
        let sign1 = decode_issuer_auth(issuer_auth)?;

        let value_digests = mso_value_digests(&sign1, doc_type, &self.params.namespace)?;
        let claims = self.namespace_claims(items, &value_digests)?;

        let algorithm = algorithm_name(&sign1)?;

        Ok(ParsedCredential {
            credential_image: self.params.image_uri.to_owned(),
            claims: CanonicalClaims::mdoc(self.params.namespace.to_owned(), claims),
            issuer: IssuerMetadata {
                issuer: None,
                key_id: key_id(&sign1),
                algorithm: algorithm.to_owned(),
                x5c: x5chain(&sign1),
            },
            signed: SignedContent {
                algorithm,
                signing_input: sign1.tbs_data(&[]),
                signature: sign1.signature,
            },
            key_binding: None,
        })
    }
}

fn decode(bytes: &[u8]) -> Result<CborValue, ParseError> {
    ciborium::from_reader(bytes).map_err(|e| ParseError::Decode(e.to_string()))
}

fn encode(value: &CborValue) -> Result<Vec<u8>, ParseError> {
    let mut bytes = vec![];
    ciborium::into_writer(value, &mut bytes).map_err(|e| ParseError::Decode(e.to_string()))?;
    Ok(bytes)
}

fn map_get<'a>(value: &'a CborValue, key: &str) -> Option<&'a CborValue> {
    value
        .as_map()?
        .iter()
        .find(|(entry_key, _)| entry_key.as_text() == Some(key))
        .map(|(_, entry_value)| entry_value)
}

fn embedded_cbor(value: &CborValue) -> Option<&Vec<u8>> {
    match value.as_tag()? {
        (EMBEDDED_CBOR_TAG, inner) => inner.as_bytes(),
        _ => None,
    }
}

/// First document of a `DeviceResponse`, or the value itself when it is a bare `Document`.
fn first_document(response: &CborValue) -> Result<&CborValue, ParseError> {
    if let Some(documents) = map_get(response, "documents") {
        return documents
            .as_array()
            .and_then(|documents| documents.first())
            .ok_or_else(|| ParseError::Malformed("no documents".to_owned()));
    }

    if map_get(response, "docType").is_some() {
        return Ok(response);
    }

    Err(ParseError::Malformed("not an mdoc DeviceResponse".to_owned()))
}

fn decode_issuer_auth(issuer_auth: &CborValue) -> Result<CoseSign1, ParseError> {
    let untagged = match issuer_auth {
        CborValue::Tag(COSE_SIGN1_TAG, inner) => inner.as_ref(),
        other => other,
    };

    CoseSign1::from_slice(&encode(untagged)?).map_err(|e| ParseError::Decode(e.to_string()))
}

/// Digests the issuer signed over, keyed by digest ID.
fn mso_value_digests(
    sign1: &CoseSign1,
    doc_type: &str,
    namespace: &str,
) -> Result<HashMap<i64, Vec<u8>>, ParseError> {
    let payload = sign1
        .payload
        .as_deref()
        .ok_or_else(|| ParseError::Integrity("issuerAuth carries no MSO".to_owned()))?;

    let mso_bytes = decode(payload).and_then(|tagged| {
        embedded_cbor(&tagged)
            .cloned()
            .ok_or_else(|| ParseError::Malformed("MSO is not tag 24".to_owned()))
    })?;
    let mso = decode(&mso_bytes)?;

    let digest_algorithm = map_get(&mso, "digestAlgorithm").and_then(CborValue::as_text);
    if !digest_algorithm.is_some_and(|alg| alg.eq_ignore_ascii_case("SHA-256")) {
        return Err(ParseError::Integrity(format!(
            "unsupported digest algorithm `{}`",
            digest_algorithm.unwrap_or_default()
        )));
    }

    if map_get(&mso, "docType").and_then(CborValue::as_text) != Some(doc_type) {
        return Err(ParseError::Integrity("MSO docType differs".to_owned()));
    }

    let valid_until = map_get(&mso, "validityInfo")
        .and_then(|validity| map_get(validity, "validUntil"))
        .and_then(|valid_until| match valid_until {
            CborValue::Tag(_, inner) => inner.as_text(),
            other => other.as_text(),
        })
        .and_then(|text| OffsetDateTime::parse(text, &Rfc3339).ok());
    if valid_until.is_some_and(|valid_until| valid_until < OffsetDateTime::now_utc()) {
        return Err(ParseError::Integrity("MSO expired".to_owned()));
    }

    map_get(&mso, "valueDigests")
        .and_then(|digests| map_get(digests, namespace))
        .and_then(CborValue::as_map)
        .ok_or_else(|| ParseError::Integrity(format!("no value digests for `{namespace}`")))?
        .iter()
        .map(|(id, digest)| {
            let id = id
                .as_integer()
                .and_then(|id| i64::try_from(id).ok())
                .ok_or_else(|| ParseError::Malformed("digest ID is not an integer".to_owned()))?;
            let digest = digest
                .as_bytes()
                .ok_or_else(|| ParseError::Malformed("digest is not a byte string".to_owned()))?;
            Ok((id, digest.to_owned()))
        })
        .collect()
}

fn algorithm_name(sign1: &CoseSign1) -> Result<String, ParseError> {
    let name = match &sign1.protected.header.alg {
        Some(RegisteredLabelWithPrivate::Assigned(iana::Algorithm::ES256)) => "ES256",
        Some(RegisteredLabelWithPrivate::Assigned(iana::Algorithm::ES384)) => "ES384",
        Some(RegisteredLabelWithPrivate::Assigned(iana::Algorithm::ES512)) => "ES512",
        Some(RegisteredLabelWithPrivate::Assigned(iana::Algorithm::EdDSA)) => "EdDSA",
        Some(other) => {
            return Err(ParseError::Integrity(format!(
                "unsupported issuerAuth algorithm `{other:?}`"
            )))
        }
        None => return Err(ParseError::Integrity("issuerAuth without algorithm".to_owned())),
    };
    Ok(name.to_owned())
}

fn key_id(sign1: &CoseSign1) -> Option<String> {
    [&sign1.unprotected, &sign1.protected.header]
        .into_iter()
        .map(|header| &header.key_id)
        .find(|key_id| !key_id.is_empty())
        .and_then(|key_id| String::from_utf8(key_id.to_owned()).ok())
}

/// DER certificates, leaf first. A single certificate may be carried as a plain byte string.
fn x5chain(sign1: &CoseSign1) -> Vec<Vec<u8>> {
    let chain = [&sign1.unprotected, &sign1.protected.header]
        .into_iter()
        .find_map(|header| {
            header
                .rest
                .iter()
                .find(|(label, _)| *label == Label::Int(X5CHAIN))
                .map(|(_, value)| value)
        });

    match chain {
        None => vec![],
        Some(value) => match (value.as_bytes(), value.as_array()) {
            (Some(certificate), _) => vec![certificate.to_owned()],
            (None, Some(certificates)) => certificates
                .iter()
                .filter_map(|certificate| certificate.as_bytes().cloned())
                .collect(),
            (None, None) => vec![],
        },
    }
}

fn cbor_to_json(value: &CborValue) -> Result<Value, ParseError> {
    let json = match value {
        CborValue::Integer(integer) => {
            let integer = i128::from(*integer);
            i64::try_from(integer)
                .map(Value::from)
                .or_else(|_| u64::try_from(integer).map(Value::from))
                .map_err(|e| ParseError::Decode(e.to_string()))?
        }
        CborValue::Bytes(bytes) => Value::String(
            Base64UrlSafeNoPadding::encode_to_string(bytes)
                .map_err(|e| ParseError::Decode(e.to_string()))?,
        ),
        CborValue::Float(float) => serde_json::Number::from_f64(*float)
            .map(Value::Number)
            .ok_or_else(|| ParseError::Decode(format!("non finite float `{float}`")))?,
        CborValue::Text(text) => Value::String(text.to_owned()),
        CborValue::Bool(boolean) => Value::Bool(*boolean),
        CborValue::Null => Value::Null,
        // full-date (1004) and tdate (0) keep their textual form
        CborValue::Tag(_, inner) => cbor_to_json(inner)?,
        CborValue::Array(items) => Value::Array(
            items
                .iter()
                .map(cbor_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        CborValue::Map(entries) => {
            let mut object = Map::with_capacity(entries.len());
            for (key, entry) in entries {
                let key = match key {
                    CborValue::Text(text) => text.to_owned(),
                    CborValue::Integer(integer) => i128::from(*integer).to_string(),
                    _ => return Err(ParseError::Decode("unsupported map key".to_owned())),
                };
                object.insert(key, cbor_to_json(entry)?);
            }
            Value::Object(object)
        }
        _ => return Err(ParseError::Decode("unsupported CBOR value".to_owned())),
    };

    Ok(json)
}
