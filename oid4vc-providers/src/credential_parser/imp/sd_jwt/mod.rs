//! SD-JWT VC presentations: `<issuer-jwt>~<disclosure>~...~[<kb-jwt>]`.

use std::sync::Arc;

use ct_codecs::{Base64, Decoder};
use oid4vc_crypto::imp::SHA_256;
use oid4vc_crypto::CryptoProvider;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::common_models::CanonicalClaims;
use crate::credential_parser::error::ParseError;
use crate::credential_parser::{
    CredentialParser, ParseResult, ParsedCredential, RawPresentation, SignedContent,
};
use crate::image_renderer::{
    CredentialImageRenderer, PlaceholderValue, TemplateLoader, TemplateSource,
};
use crate::jwt::mapper::json_from_b64url;
use crate::jwt::model::JwtHeader;
use crate::jwt::Jwt;
use crate::key_resolver::IssuerMetadata;
use crate::util::date_format::{format_ddmmyyyy, format_localized, parse_date_value};

mod disclosures;


use disclosures::{decode_disclosures, reconstruct};

const DISCLOSURE_SEPARATOR: char = '~';

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    /// `vct` values this deployment verifies
    pub accepted_vcts: Vec<String>,
    /// claims rendered as `DD/MM/YYYY`
    #[serde(default = "default_date_claims")]
    pub date_claims: Vec<String>,
    /// claims rendered as a localized date
    #[serde(default = "default_expiry_claims")]
    pub expiry_claims: Vec<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// used when the credential carries no SVG template of its own, or one from a foreign origin
    #[serde(default)]
    pub default_template: Option<TemplateSource>,
    /// origins (`https://host[:port]`) a `vctm` SVG template may be fetched from
    #[serde(default)]
    pub template_origins: Vec<String>,
}

fn default_date_claims() -> Vec<String> {
    ["birthdate", "birth_date", "issuance_date", "issuing_date", "effective_from_date"]
        .map(ToOwned::to_owned)
        .to_vec()
}

fn default_expiry_claims() -> Vec<String> {
    ["expiry_date", "effective_until_date"]
        .map(ToOwned::to_owned)
        .to_vec()
}

fn default_locale() -> String {
    "en-US".to_owned()
}

impl Params {
    pub fn new(accepted_vcts: Vec<String>) -> Self {
        Self {
            accepted_vcts,
            date_claims: default_date_claims(),
            expiry_claims: default_expiry_claims(),
            locale: default_locale(),
            default_template: None,
            template_origins: vec![],
        }
    }
}

pub struct SdJwtParser {
    crypto: Arc<dyn CryptoProvider>,
    template_loader: Arc<dyn TemplateLoader>,
    renderer: Arc<dyn CredentialImageRenderer>,
    params: Params,
}

impl SdJwtParser {
    pub fn new(
        crypto: Arc<dyn CryptoProvider>,
        template_loader: Arc<dyn TemplateLoader>,
        renderer: Arc<dyn CredentialImageRenderer>,
        params: Params,
    ) -> Self {
        Self {
            crypto,
            template_loader,
            renderer,
            params,
        }
    }

    async fn render(
        &self,
        header: &JwtHeader,
        claims: &Map<String, Value>,
        vct: &str,
    ) -> Result<String, ParseError> {
        let embedded_uri = header.vctm.as_ref().and_then(|vctm| {
            svg_template_uri(&type_metadata_documents(vctm), vct, &self.params.locale)
        });

        let source = match embedded_uri {
            Some(uri) if self.template_allowed(&uri) => Some(TemplateSource::Uri { uri }),
            Some(uri) => {
                tracing::debug!(%uri, "vctm template outside allowed origins, using default");
                self.params.default_template.clone()
            }
            None => self.params.default_template.clone(),
        }
        .ok_or_else(|| ParseError::Render("no SVG template available".to_owned()))?;

        let template = self
            .template_loader
            .load(&source)
            .await
            .map_err(|e| ParseError::Render(e.to_string()))?;

        let mut values = vec![];
        self.collect_placeholders("", claims, &mut values);

        self.renderer
            .render(&template, &values)
            .map_err(|e| ParseError::Render(e.to_string()))
    }

    /// `data:` templates need no fetch; anything else only from a configured origin.
    fn template_allowed(&self, uri: &str) -> bool {
        if uri.starts_with("data:") {
            return true;
        }

        let Ok(url) = Url::parse(uri) else {
            return false;
        };
        let origin = url.origin().ascii_serialization();

        self.params
            .template_origins
            .iter()
            .any(|allowed| allowed.trim_end_matches('/') == origin)
    }

    fn collect_placeholders(
        &self,
        prefix: &str,
        claims: &Map<String, Value>,
        values: &mut Vec<PlaceholderValue>,
    ) {
        for (name, value) in claims {
            if prefix.is_empty() && name == "cnf" {
                continue;
            }

            let path = if prefix.is_empty() {
                name.to_owned()
            } else {
                format!("{prefix}.{name}")
            };

            match value {
                Value::Object(object) => self.collect_placeholders(&path, object, values),
                Value::Array(_) => {}
                scalar => {
                    let text = self.display_value(&path, scalar);
                    values.push(PlaceholderValue::new(path, text));
                }
            }
        }
    }

    fn display_value(&self, path: &str, value: &Value) -> String {
        let formatted = if listed(&self.params.expiry_claims, path) {
            parse_date_value(value).and_then(|date| format_localized(date, &self.params.locale))
        } else if listed(&self.params.date_claims, path) {
            parse_date_value(value).and_then(format_ddmmyyyy)
        } else {
            None
        };

        formatted.unwrap_or_else(|| match value {
            Value::String(text) => text.to_owned(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl CredentialParser for SdJwtParser {
    async fn parse(&self, raw: &RawPresentation) -> ParseResult {
        let text = raw.as_text()?;

        if !text.contains(DISCLOSURE_SEPARATOR) {
            return Err(ParseError::Malformed(
                "missing disclosure separator".to_owned(),
            ));
        }

        let mut parts: Vec<&str> = text.split(DISCLOSURE_SEPARATOR).collect();
        let jwt = parts.remove(0);

        let key_binding = match parts.pop() {
            Some(last) if last.contains('.') => Some(last.to_owned()),
            Some(last) if !last.is_empty() => {
                parts.push(last);
                None
            }
            _ => None,
        };

        if parts.iter().any(|part| part.is_empty()) {
            return Err(ParseError::Malformed("empty disclosure".to_owned()));
        }

        let token = Jwt::<Map<String, Value>>::decompose_token(jwt)
            .map_err(|e| ParseError::Decode(e.to_string()))?;
        let mut payload = token.payload;

        match payload.remove("_sd_alg") {
            None => {}
            Some(Value::String(alg)) if alg == SHA_256 => {}
            Some(other) => {
                return Err(ParseError::Integrity(format!(
                    "unsupported disclosure digest algorithm `{other}`"
                )));
            }
        }

        let hasher = self
            .crypto
            .get_hasher(SHA_256)
            .map_err(|e| ParseError::Integrity(e.to_string()))?;

        let disclosures = decode_disclosures(&parts, &*hasher)?;
        let claims = reconstruct(payload, &disclosures)?;

        let vct = claims
            .get("vct")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::TypeMismatch("missing `vct`".to_owned()))?;

        if !self.params.accepted_vcts.iter().any(|accepted| accepted == vct) {
            return Err(ParseError::TypeMismatch(vct.to_owned()));
        }

        let credential_image = self.render(&token.header, &claims, vct).await?;

        let issuer = IssuerMetadata {
            issuer: claims.get("iss").and_then(Value::as_str).map(ToOwned::to_owned),
            key_id: token.header.key_id.to_owned(),
            algorithm: token.header.algorithm.to_owned(),
            x5c: decode_x5c(token.header.x5c.as_deref().unwrap_or_default())?,
        };

        Ok(ParsedCredential {
            credential_image,
            issuer,
            signed: SignedContent {
                algorithm: token.header.algorithm,
                signing_input: token.signing_input.into_bytes(),
                signature: token.signature,
            },
            claims: CanonicalClaims::sd_jwt(claims),
            key_binding,
        })
    }
}

fn listed(claims: &[String], path: &str) -> bool {
    claims.iter().any(|claim| claim == path)
}

fn decode_x5c(certificates: &[String]) -> Result<Vec<Vec<u8>>, ParseError> {
    certificates
        .iter()
        .map(|certificate| {
            Base64::decode_to_vec(certificate, None).map_err(|e| ParseError::Decode(e.to_string()))
        })
        .collect()
}

/// `vctm` header in either convention: the document itself or an array of base64url documents.
fn type_metadata_documents(vctm: &Value) -> Vec<Value> {
    match vctm {
        Value::Object(_) => vec![vctm.to_owned()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(encoded) => json_from_b64url(encoded).ok(),
                Value::Object(_) => Some(item.to_owned()),
                _ => None,
            })
            .collect(),
        _ => vec![],
    }
}

/// First SVG template of the display entry for `locale`, or of the first display entry.
fn svg_template_uri(documents: &[Value], vct: &str, locale: &str) -> Option<String> {
    let document = documents
        .iter()
        .find(|document| document.get("vct").and_then(Value::as_str) == Some(vct))
        .or_else(|| documents.first())?;

    // `{"lang": "en-US", "rendering": ..}` or `{"en-US": {"rendering": ..}}`
    let renderings: Vec<(Option<&str>, &Value)> = document
        .get("display")?
        .as_array()?
        .iter()
        .filter_map(|display| match display.get("rendering") {
            Some(rendering) => Some((
                display
                    .get("lang")
                    .or_else(|| display.get("locale"))
                    .and_then(Value::as_str),
                rendering,
            )),
            None => display.as_object()?.iter().find_map(|(lang, entry)| {
                entry
                    .get("rendering")
                    .map(|rendering| (Some(lang.as_str()), rendering))
            }),
        })
        .collect();

    let (_, rendering) = renderings
        .iter()
        .find(|(lang, _)| *lang == Some(locale))
        .or_else(|| renderings.first())?;

    rendering
        .get("svg_templates")?
        .as_array()?
        .first()?
        .get("uri")?
        .as_str()
        .map(ToOwned::to_owned)
}
