use jsonschema::JSONSchema;
use serde_json::Value;
use serde_json_path::JsonPath;

use super::error::MatcherError;
use super::model::{
    ConstraintField, DisclosedField, InputDescriptor, LimitDisclosure, MatchOutcome,
    PresentationDefinition,
};
use crate::common_models::CanonicalClaims;

/// Evaluates presentation definitions against canonical claims.
///
/// Descriptors are tried in order; the definition is satisfied by the first satisfied descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresentationDefinitionMatcher;

struct DescriptorOutcome {
    accepted: bool,
    missing: Vec<String>,
    disclosed: Vec<DisclosedField>,
}

impl PresentationDefinitionMatcher {
    pub fn matches(
        &self,
        definition: &PresentationDefinition,
        claims: &CanonicalClaims,
    ) -> Result<MatchOutcome, MatcherError> {
        let document = claims.document();
        let mut best: Option<DescriptorOutcome> = None;

        for descriptor in &definition.input_descriptors {
            if !descriptor.accepts_format(claims.format(), definition.format.as_ref()) {
                tracing::debug!(
                    descriptor = %descriptor.id,
                    format = %claims.format(),
                    "format not requested"
                );
                continue;
            }

            let outcome = evaluate(descriptor, &document)?;
            if outcome.accepted {
                tracing::debug!(
                    definition = %definition.id,
                    descriptor = %descriptor.id,
                    tolerated_missing = outcome.missing.len(),
                    "presentation definition satisfied"
                );
                return Ok(MatchOutcome {
                    accepted: true,
                    missing: outcome.missing,
                    matched_descriptor: Some(descriptor.id.to_owned()),
                    disclosed: outcome.disclosed,
                });
            }

            if best
                .as_ref()
                .map_or(true, |best| outcome.missing.len() < best.missing.len())
            {
                best = Some(outcome);
            }
        }

        let missing = best.map(|outcome| outcome.missing).unwrap_or_default();
        tracing::debug!(
            definition = %definition.id,
            ?missing,
            "presentation definition not satisfied"
        );

        Ok(MatchOutcome {
            accepted: false,
            missing,
            matched_descriptor: None,
            disclosed: vec![],
        })
    }
}

fn evaluate(
    descriptor: &InputDescriptor,
    document: &Value,
) -> Result<DescriptorOutcome, MatcherError> {
    let limit_disclosure =
        descriptor.constraints.limit_disclosure == Some(LimitDisclosure::Required);

    let mut accepted = true;
    let mut missing = vec![];
    let mut disclosed = vec![];

    for field in &descriptor.constraints.fields {
        match resolve(field, document)? {
            Some((path, value)) => disclosed.push(DisclosedField {
                name: field.display_name().to_owned(),
                path,
                value,
            }),
            None => {
                if limit_disclosure || !field.optional {
                    accepted = false;
                }
                missing.push(field.display_name().to_owned());
            }
        }
    }

    Ok(DescriptorOutcome {
        accepted,
        missing,
        disclosed,
    })
}

/// First path that resolves to a value satisfying the filter.
fn resolve(
    field: &ConstraintField,
    document: &Value,
) -> Result<Option<(String, Value)>, MatcherError> {
    let filter = field
        .value_filter()
        .map(|filter| {
            JSONSchema::compile(filter).map_err(|e| MatcherError::InvalidFilter {
                field: field.display_name().to_owned(),
                reason: e.to_string(),
            })
        })
        .transpose()?;

    for path in &field.path {
        let json_path = JsonPath::parse(path).map_err(|e| MatcherError::InvalidPath {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;

        let Some(value) = json_path.query(document).first() else {
            continue;
        };

        if filter.as_ref().map_or(true, |filter| filter.is_valid(value)) {
            return Ok(Some((path.to_owned(), value.to_owned())));
        }
    }

    Ok(None)
}
