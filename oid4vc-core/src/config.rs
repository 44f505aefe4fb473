use std::fmt;

use oid4vc_providers::credential_parser::ParserKind;
use oid4vc_providers::credential_signer::model::{CredentialTyp, TypeMetadataEmbedding};
use oid4vc_providers::image_renderer::imp::template_loader::Params as TemplateLoaderParams;
use oid4vc_providers::image_renderer::TemplateSource;
use oid4vc_providers::key_resolver::imp::jwt_vc_issuer::Params as JwtVcIssuerParams;
use oid4vc_providers::key_resolver::imp::static_key::StaticKeyEntry;
use oid4vc_providers::key_resolver::ResolverKind;
use oid4vc_providers::presentation_definition::model::PresentationDefinition;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::credential_type::CredentialTypeConfig;

/// Deployment configuration, read once at start-up.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
    #[serde(default)]
    pub issuer: IssuerConfig,
    #[serde(default)]
    pub verifier: VerifierConfig,
    /// static catalog the verifier requests presentations from
    #[serde(default)]
    pub presentation_definitions: Vec<PresentationDefinition>,
    #[serde(default)]
    pub credential_types: Vec<CredentialTypeConfig>,
    #[serde(default)]
    pub identity_field_mapping: IdentityFieldMapping,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerConfig {
    pub url: String,
    /// without a key the deployment only verifies
    #[serde(default)]
    pub key: Option<IssuerKeyConfig>,
    #[serde(default = "default_algorithms")]
    pub credential_signing_algs: Vec<String>,
    #[serde(default)]
    pub typ: CredentialTyp,
    /// overrides the `vctm` embedding implied by `typ`
    #[serde(default)]
    pub vctm_embedding: Option<TypeMetadataEmbedding>,
    /// advertised as `kb-jwt_alg_values` when set
    #[serde(default)]
    pub kb_jwt_alg_values: Option<Vec<String>>,
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8003".to_owned(),
            key: None,
            credential_signing_algs: default_algorithms(),
            typ: CredentialTyp::default(),
            vctm_embedding: None,
            kb_jwt_alg_values: None,
            locale: default_locale(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerKeyConfig {
    /// private JWK
    pub private_jwk: Zeroizing<String>,
    #[serde(default)]
    pub key_id: Option<String>,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl fmt::Debug for IssuerKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuerKeyConfig")
            .field("private_jwk", &"***")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifierConfig {
    #[serde(default)]
    pub accepted_vcts: Vec<String>,
    #[serde(default = "default_mdoc_doc_type")]
    pub mdoc_doc_type: String,
    #[serde(default = "default_mdoc_doc_type")]
    pub mdoc_namespace: String,
    #[serde(default)]
    pub mdoc_image_uri: String,
    #[serde(default)]
    pub default_svg_template: Option<TemplateSource>,
    /// origins a credential's own `vctm` SVG template may be fetched from
    #[serde(default)]
    pub template_origins: Vec<String>,
    /// keeps the parser defaults when unset
    #[serde(default)]
    pub date_claims: Option<Vec<String>>,
    #[serde(default)]
    pub expiry_claims: Option<Vec<String>>,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// PEM certificates anchoring `x5c` chains
    #[serde(default)]
    pub trusted_root_certificates: Vec<String>,
    #[serde(default)]
    pub static_keys: Vec<StaticKeyEntry>,
    /// `iss` values the DID and issuer metadata resolvers may resolve keys for
    #[serde(default)]
    pub trusted_issuers: Vec<String>,
    #[serde(default = "default_parser_order")]
    pub parser_order: Vec<ParserKind>,
    #[serde(default = "default_resolver_order")]
    pub resolver_order: Vec<ResolverKind>,
    /// credential signature algorithms accepted from issuers
    #[serde(default = "default_algorithms")]
    pub allowed_algorithms: Vec<String>,
    #[serde(default)]
    pub jwt_vc_issuer: JwtVcIssuerParams,
    #[serde(default)]
    pub template_loader: TemplateLoaderParams,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            accepted_vcts: vec![],
            mdoc_doc_type: default_mdoc_doc_type(),
            mdoc_namespace: default_mdoc_doc_type(),
            mdoc_image_uri: String::new(),
            default_svg_template: None,
            template_origins: vec![],
            date_claims: None,
            expiry_claims: None,
            locale: default_locale(),
            trusted_root_certificates: vec![],
            static_keys: vec![],
            trusted_issuers: vec![],
            parser_order: default_parser_order(),
            resolver_order: default_resolver_order(),
            allowed_algorithms: default_algorithms(),
            jwt_vc_issuer: JwtVcIssuerParams::default(),
            template_loader: TemplateLoaderParams::default(),
        }
    }
}

/// Constraint field names an accepted PID presentation is read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityFieldMapping {
    pub family_name: String,
    pub given_name: String,
    pub birthdate: String,
}

impl Default for IdentityFieldMapping {
    fn default() -> Self {
        Self {
            family_name: "Family Name".to_owned(),
            given_name: "Given Name".to_owned(),
            birthdate: "Birthdate".to_owned(),
        }
    }
}

fn default_algorithm() -> String {
    "ES256".to_owned()
}

fn default_algorithms() -> Vec<String> {
    vec![default_algorithm()]
}

fn default_locale() -> String {
    "en-US".to_owned()
}

fn default_mdoc_doc_type() -> String {
    "eu.europa.ec.eudi.pid.1".to_owned()
}

fn default_parser_order() -> Vec<ParserKind> {
    vec![ParserKind::SdJwt, ParserKind::Mdoc]
}

fn default_resolver_order() -> Vec<ResolverKind> {
    vec![ResolverKind::StaticKey, ResolverKind::X5c]
}
