use std::collections::{HashMap, HashSet};

use oid4vc_crypto::Hasher;
use serde_json::{Map, Value};

use crate::credential_parser::error::ParseError;
use crate::jwt::mapper::json_from_b64url;

const SELECTIVE_DISCLOSURE_MARKER: &str = "_sd";
const ARRAY_ELEMENT_MARKER: &str = "...";

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Disclosure {
    pub digest: String,
    /// absent for array element disclosures
    pub name: Option<String>,
    pub value: Value,
}

pub(super) fn decode_disclosures(
    encoded: &[&str],
    hasher: &dyn Hasher,
) -> Result<HashMap<String, Disclosure>, ParseError> {
    let mut disclosures = HashMap::with_capacity(encoded.len());

    for encoded in encoded {
        let disclosure = decode_disclosure(encoded, hasher)?;
        if disclosures.contains_key(&disclosure.digest) {
            return Err(ParseError::Integrity("duplicate disclosure".to_owned()));
        }
        disclosures.insert(disclosure.digest.to_owned(), disclosure);
    }

    Ok(disclosures)
}

fn decode_disclosure(encoded: &str, hasher: &dyn Hasher) -> Result<Disclosure, ParseError> {
    let array: Vec<Value> =
        json_from_b64url(encoded).map_err(|e| ParseError::Decode(e.to_string()))?;

    let digest = hasher
        .hash_base64(encoded.as_bytes())
        .map_err(|e| ParseError::Integrity(e.to_string()))?;

    let mut array = array.into_iter();
    match (array.next(), array.next(), array.next(), array.next()) {
        (Some(Value::String(_)), Some(Value::String(name)), Some(value), None) => {
            if name == SELECTIVE_DISCLOSURE_MARKER || name == ARRAY_ELEMENT_MARKER {
                return Err(ParseError::Integrity(format!("reserved claim name `{name}`")));
            }
            Ok(Disclosure {
                digest,
                name: Some(name),
                value,
            })
        }
        (Some(Value::String(_)), Some(value), None, None) => Ok(Disclosure {
            digest,
            name: None,
            value,
        }),
        _ => Err(ParseError::Decode(
            "expecting [<salt>, <name>, <value>] or [<salt>, <value>]".to_owned(),
        )),
    }
}

/// Rebuilds the plain claim object. Every disclosure must be referenced exactly once.
pub(super) fn reconstruct(
    payload: Map<String, Value>,
    disclosures: &HashMap<String, Disclosure>,
) -> Result<Map<String, Value>, ParseError> {
    let mut used = HashSet::with_capacity(disclosures.len());

    let claims = unblind_object(payload, disclosures, &mut used)?;

    if used.len() != disclosures.len() {
        return Err(ParseError::Integrity(
            "disclosure not referenced by the credential".to_owned(),
        ));
    }

    Ok(claims)
}

fn unblind(
    value: Value,
    disclosures: &HashMap<String, Disclosure>,
    used: &mut HashSet<String>,
) -> Result<Value, ParseError> {
    match value {
        Value::Object(object) => Ok(Value::Object(unblind_object(object, disclosures, used)?)),
        Value::Array(elements) => {
            let mut result = Vec::with_capacity(elements.len());
            for element in elements {
                match array_element_digest(&element) {
                    Some(digest) => {
                        // undisclosed or decoy elements are dropped
                        if let Some(disclosure) = take(digest, disclosures, used)? {
                            if disclosure.name.is_some() {
                                return Err(ParseError::Integrity(
                                    "object disclosure used for an array element".to_owned(),
                                ));
                            }
                            result.push(unblind(disclosure.value.to_owned(), disclosures, used)?);
                        }
                    }
                    None => result.push(unblind(element, disclosures, used)?),
                }
            }
            Ok(Value::Array(result))
        }
        other => Ok(other),
    }
}

fn unblind_object(
    mut object: Map<String, Value>,
    disclosures: &HashMap<String, Disclosure>,
    used: &mut HashSet<String>,
) -> Result<Map<String, Value>, ParseError> {
    let digests = match object.remove(SELECTIVE_DISCLOSURE_MARKER) {
        None => vec![],
        Some(Value::Array(digests)) => digests,
        Some(_) => {
            return Err(ParseError::Integrity("`_sd` is not an array".to_owned()));
        }
    };

    let mut result = Map::with_capacity(object.len() + digests.len());
    for (name, value) in object {
        result.insert(name, unblind(value, disclosures, used)?);
    }

    for digest in &digests {
        let digest = digest
            .as_str()
            .ok_or_else(|| ParseError::Integrity("digest is not a string".to_owned()))?;

        // digests without a disclosure are undisclosed claims or decoys
        let Some(disclosure) = take(digest, disclosures, used)? else {
            continue;
        };

        let name = disclosure.name.as_ref().ok_or_else(|| {
            ParseError::Integrity("array element disclosure used for an object member".to_owned())
        })?;

        if result.contains_key(name) {
            return Err(ParseError::Integrity(format!(
                "disclosure overwrites claim `{name}`"
            )));
        }

        let value = unblind(disclosure.value.to_owned(), disclosures, used)?;
        result.insert(name.to_owned(), value);
    }

    Ok(result)
}

fn take<'a>(
    digest: &str,
    disclosures: &'a HashMap<String, Disclosure>,
    used: &mut HashSet<String>,
) -> Result<Option<&'a Disclosure>, ParseError> {
    let Some(disclosure) = disclosures.get(digest) else {
        return Ok(None);
    };

    if !used.insert(digest.to_owned()) {
        return Err(ParseError::Integrity(
            "digest referenced more than once".to_owned(),
        ));
    }

    Ok(Some(disclosure))
}

fn array_element_digest(element: &Value) -> Option<&str> {
    let object = element.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.get(ARRAY_ELEMENT_MARKER)?.as_str()
}
