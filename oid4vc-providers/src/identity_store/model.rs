use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityQuery {
    pub family_name: String,
    pub given_name: String,
    pub birthdate: String,
}

/// Row of the personal identification dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidRecord {
    #[serde(rename = "Number", deserialize_with = "scalar_to_string")]
    pub number: String,
    #[serde(deserialize_with = "scalar_to_string")]
    pub family_name: String,
    #[serde(deserialize_with = "scalar_to_string")]
    pub given_name: String,
    #[serde(alias = "birthdate", deserialize_with = "scalar_to_string")]
    pub birth_date: String,
}

/// Row of the power of representation dataset, linked to a [`PidRecord`] by `number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PorRecord {
    #[serde(rename = "Number", deserialize_with = "scalar_to_string")]
    pub number: String,
    #[serde(deserialize_with = "scalar_to_string")]
    pub legal_person_identifier: String,
    #[serde(deserialize_with = "scalar_to_string")]
    pub legal_name: String,
    #[serde(deserialize_with = "scalar_to_string")]
    pub full_powers: String,
    #[serde(deserialize_with = "scalar_to_string")]
    pub effective_from_date: String,
    #[serde(default, deserialize_with = "optional_scalar_to_string")]
    pub effective_until_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub pid: PidRecord,
    pub por: PorRecord,
}

fn scalar_string(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn scalar_to_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    scalar_string(Value::deserialize(deserializer)?)
        .ok_or_else(|| serde::de::Error::custom("expected a string, number or boolean"))
}

fn optional_scalar_to_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(scalar_string(Value::deserialize(deserializer)?).filter(|text| !text.is_empty()))
}
