//! Issuer-side description of a credential type: identifiers, display, type
//! metadata and which claims the holder may hide.

use oid4vc_providers::credential_signer::error::SigningError;
use oid4vc_providers::credential_signer::model::DisclosureFrame;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::IssuerConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialTypeConfig {
    /// `vct` of issued credentials
    pub id: String,
    /// OAuth scope token that grants this credential
    pub scope: String,
    /// type name listed in `types`, e.g. `PowerOfRepresentation`
    pub label: String,
    #[serde(default = "default_format")]
    pub format: String,
    pub display: CredentialDisplay,
    #[serde(default)]
    pub svg_template_uri: Option<String>,
    #[serde(default)]
    pub claims: Vec<ClaimMetadata>,
    #[serde(default)]
    pub schema: Option<Value>,
    /// top-level claims issued as selective disclosures
    #[serde(default)]
    pub disclosure_frame: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDisplay {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    pub locale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimMetadata {
    pub path: Vec<String>,
    pub label: String,
    pub description: String,
}

fn default_format() -> String {
    "vc+sd-jwt".to_owned()
}

impl CredentialTypeConfig {
    /// Power of Representation credential issued to holders of a PID.
    pub fn power_of_representation(issuer_url: &str) -> Self {
        let claim = |name: &str, label: &str, description: &str| ClaimMetadata {
            path: vec![name.to_owned()],
            label: label.to_owned(),
            description: description.to_owned(),
        };

        Self {
            id: "urn:credential:por".to_owned(),
            scope: "por".to_owned(),
            label: "PowerOfRepresentation".to_owned(),
            format: default_format(),
            display: CredentialDisplay {
                name: "Power of Representation credential".to_owned(),
                description: "This is a Power of Representation credential".to_owned(),
                background_image: Some(format!("{issuer_url}/images/card.png")),
                background_color: Some("#4CC3DD".to_owned()),
                text_color: Some("#FFFFFF".to_owned()),
                locale: "en-US".to_owned(),
            },
            svg_template_uri: Some(format!("{issuer_url}/images/template.svg")),
            claims: vec![
                claim(
                    "legal_person_identifier",
                    "Legal Person Identifier",
                    "Identifier of the represented legal person",
                ),
                claim("legal_name", "Legal Name", "Name of the represented legal person"),
                claim(
                    "full_powers",
                    "Full Powers",
                    "Whether the holder represents the legal person without restriction",
                ),
                claim(
                    "effective_from_date",
                    "Effective From",
                    "Start of the representation",
                ),
                claim(
                    "effective_until_date",
                    "Effective Until",
                    "End of the representation",
                ),
            ],
            schema: None,
            disclosure_frame: ["legal_person_identifier", "legal_name", "full_powers"]
                .map(ToOwned::to_owned)
                .to_vec(),
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_scope(&self) -> &str {
        &self.scope
    }

    pub fn get_format(&self) -> &str {
        &self.format
    }

    pub fn get_types(&self) -> Vec<String> {
        vec![
            "VerifiableCredential".to_owned(),
            "VerifiableAttestation".to_owned(),
            self.label.to_owned(),
            self.id.to_owned(),
        ]
    }

    pub fn get_display(&self) -> Value {
        let display = &self.display;
        let mut object = Map::new();
        object.insert("name".to_owned(), json!(display.name));
        object.insert("description".to_owned(), json!(display.description));
        if let Some(uri) = &display.background_image {
            object.insert("background_image".to_owned(), json!({ "uri": uri }));
        }
        if let Some(color) = &display.background_color {
            object.insert("background_color".to_owned(), json!(color));
        }
        if let Some(color) = &display.text_color {
            object.insert("text_color".to_owned(), json!(color));
        }
        object.insert("locale".to_owned(), json!(display.locale));
        Value::Object(object)
    }

    /// SD-JWT VC type metadata document, embedded as `vctm`.
    pub fn metadata(&self) -> Value {
        let display = &self.display;
        let locale = display.locale.as_str();

        let mut rendering = Map::new();
        rendering.insert(
            "simple".to_owned(),
            json!({
                "logo": {
                    "uri": display.background_image,
                    "alt_text": display.description,
                },
                "background_color": display.background_color,
                "text_color": display.text_color,
            }),
        );
        if let Some(uri) = &self.svg_template_uri {
            rendering.insert("svg_templates".to_owned(), json!([{ "uri": uri }]));
        }

        let claims: Vec<Value> = self
            .claims
            .iter()
            .map(|claim| {
                let sd = if self.is_disclosable(claim) {
                    "allowed"
                } else {
                    "never"
                };

                json!({
                    "path": claim.path,
                    "display": localized(
                        locale,
                        json!({ "label": claim.label, "description": claim.description }),
                    ),
                    "verification": "verified",
                    "sd": sd,
                })
            })
            .collect();

        json!({
            "vct": self.id,
            "name": display.name,
            "description": display.description,
            "display": [localized(
                locale,
                json!({ "name": display.name, "rendering": rendering }),
            )],
            "claims": claims,
            "schema": self.schema.clone().unwrap_or_else(|| self.default_schema()),
        })
    }

    /// Entry of `credential_configurations_supported` in the issuer metadata.
    pub fn export_credential_supported_object(&self, issuer: &IssuerConfig) -> Value {
        let mut object = json!({
            "scope": self.scope,
            "vct": self.id,
            "format": self.format,
            "display": [self.get_display()],
            "cryptographic_binding_methods_supported": ["jwk"],
            "credential_signing_alg_values_supported": issuer.credential_signing_algs,
            "proof_types_supported": {
                "jwt": {
                    "proof_signing_alg_values_supported": issuer.credential_signing_algs,
                }
            },
        });

        if let (Some(algorithms), Some(object)) =
            (&issuer.kb_jwt_alg_values, object.as_object_mut())
        {
            object.insert("kb-jwt_alg_values".to_owned(), json!(algorithms));
        }

        object
    }

    /// Frame for `payload`; fails when a framed claim was not issued.
    pub fn disclosure_frame(
        &self,
        payload: &Map<String, Value>,
    ) -> Result<DisclosureFrame, SigningError> {
        DisclosureFrame::new(
            self.disclosure_frame
                .iter()
                .map(|name| (name.to_owned(), true)),
            payload,
        )
    }

    fn is_disclosable(&self, claim: &ClaimMetadata) -> bool {
        claim
            .path
            .first()
            .is_some_and(|name| self.disclosure_frame.contains(name))
    }

    fn default_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .claims
            .iter()
            .filter_map(|claim| claim.path.first())
            .map(|name| (name.to_owned(), json!({ "type": "string" })))
            .collect();

        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": properties,
            "required": [],
            "additionalProperties": true,
        })
    }
}

fn localized(locale: &str, value: Value) -> Value {
    let mut object = Map::new();
    object.insert(locale.to_owned(), value);
    Value::Object(object)
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn issuer() -> IssuerConfig {
        IssuerConfig {
            url: "https://issuer.example".to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_por_identifiers() {
        let por = CredentialTypeConfig::power_of_representation("https://issuer.example");

        assert_eq!(por.get_id(), "urn:credential:por");
        assert_eq!(por.get_scope(), "por");
        assert_eq!(por.get_format(), "vc+sd-jwt");
        assert_eq!(
            por.get_types(),
            vec![
                "VerifiableCredential",
                "VerifiableAttestation",
                "PowerOfRepresentation",
                "urn:credential:por"
            ]
        );
    }

    #[test]
    fn test_metadata_points_to_svg_template() {
        let por = CredentialTypeConfig::power_of_representation("https://issuer.example");
        let metadata = por.metadata();

        assert_eq!(metadata["vct"], "urn:credential:por");
        assert_eq!(
            metadata["display"][0]["en-US"]["rendering"]["svg_templates"][0]["uri"],
            "https://issuer.example/images/template.svg"
        );
        assert_eq!(metadata["claims"][0]["path"], json!(["legal_person_identifier"]));
        assert_eq!(metadata["claims"][0]["sd"], "allowed");
        assert_eq!(metadata["claims"][3]["sd"], "never");
        assert_eq!(
            metadata["schema"]["properties"]["legal_name"]["type"],
            "string"
        );
    }

    #[test]
    fn test_credential_supported_object_without_kb_jwt_algorithms() {
        let por = CredentialTypeConfig::power_of_representation("https://issuer.example");
        let object = por.export_credential_supported_object(&issuer());

        assert_eq!(object["scope"], "por");
        assert_eq!(object["credential_signing_alg_values_supported"], json!(["ES256"]));
        assert_eq!(
            object["proof_types_supported"]["jwt"]["proof_signing_alg_values_supported"],
            json!(["ES256"])
        );
        assert_eq!(
            object["display"][0]["background_image"]["uri"],
            "https://issuer.example/images/card.png"
        );
        assert!(object.get("kb-jwt_alg_values").is_none());
    }

    #[test]
    fn test_credential_supported_object_with_kb_jwt_algorithms() {
        let por = CredentialTypeConfig::power_of_representation("https://issuer.example");
        let issuer = IssuerConfig {
            kb_jwt_alg_values: Some(vec!["ES256".to_owned()]),
            ..issuer()
        };

        let object = por.export_credential_supported_object(&issuer);
        assert_eq!(object["kb-jwt_alg_values"], json!(["ES256"]));
    }

    #[test]
    fn test_disclosure_frame_requires_issued_claims() {
        let por = CredentialTypeConfig::power_of_representation("https://issuer.example");
        let Value::Object(payload) = json!({
            "legal_person_identifier": "LPI-001",
            "legal_name": "Acme Corp",
        }) else {
            unreachable!()
        };

        assert_eq!(
            por.disclosure_frame(&payload).unwrap_err(),
            SigningError::UnknownDisclosureFrameKey("full_powers".to_owned())
        );
    }
}
