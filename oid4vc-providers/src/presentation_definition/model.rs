use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::formats::PreferMany;
use serde_with::{serde_as, OneOrMany};

use crate::common_models::ClaimFormat;

/// Format designations (`vc+sd-jwt`, `mso_mdoc`, ..) mapped to algorithm constraints.
pub type FormatConstraint = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// the holder picks the fields at request time
    #[serde(default)]
    pub selectable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatConstraint>,
    pub input_descriptors: Vec<InputDescriptor>,
}

impl PresentationDefinition {
    /// Selectable definition assembled from descriptors built at request time.
    pub fn custom(id: impl Into<String>, input_descriptors: Vec<InputDescriptor>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            selectable: true,
            format: None,
            input_descriptors,
        }
    }

    /// Narrows every descriptor to the fields the holder chose.
    pub fn select(&self, chosen: &[String]) -> Self {
        Self::custom(
            self.id.to_owned(),
            self.input_descriptors
                .iter()
                .map(|descriptor| {
                    InputDescriptor::from_selection(
                        descriptor.id.to_owned(),
                        descriptor.format.to_owned(),
                        &descriptor.constraints.fields,
                        chosen,
                    )
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatConstraint>,
    pub constraints: Constraints,
}

impl InputDescriptor {
    /// Keeps the fields of `available` whose name (or first path) is in `chosen`.
    pub fn from_selection(
        id: impl Into<String>,
        format: Option<FormatConstraint>,
        available: &[ConstraintField],
        chosen: &[String],
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            purpose: None,
            format,
            constraints: Constraints {
                limit_disclosure: Some(LimitDisclosure::Required),
                fields: available
                    .iter()
                    .filter(|field| chosen.iter().any(|name| name == field.display_name()))
                    .cloned()
                    .collect(),
            },
        }
    }

    /// Descriptor format, else the definition-wide one. No constraint accepts every format.
    pub fn accepts_format(&self, format: ClaimFormat, fallback: Option<&FormatConstraint>) -> bool {
        match self.format.as_ref().or(fallback) {
            None => true,
            Some(constraint) => constraint
                .keys()
                .any(|designation| ClaimFormat::from_designation(designation) == Some(format)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_disclosure: Option<LimitDisclosure>,
    #[serde(default)]
    pub fields: Vec<ConstraintField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitDisclosure {
    Required,
    Preferred,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// JSONPath expressions, tried in order; a single string is accepted
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_to_retain: Option<bool>,
}

impl ConstraintField {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.path.first().map(String::as_str))
            .unwrap_or_default()
    }

    /// A missing or empty filter only requires presence.
    pub fn value_filter(&self) -> Option<&Value> {
        self.filter
            .as_ref()
            .filter(|filter| !filter.as_object().is_some_and(Map::is_empty))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisclosedField {
    pub name: String,
    pub path: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub accepted: bool,
    /// names of unmet field constraints
    pub missing: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_descriptor: Option<String>,
    pub disclosed: Vec<DisclosedField>,
}
