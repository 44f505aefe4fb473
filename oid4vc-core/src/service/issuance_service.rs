use std::sync::Arc;

use oid4vc_providers::common_models::PublicKeyJwk;
use oid4vc_providers::credential_signer::model::{
    CredentialHeader, CredentialTyp, IssuedCredential, TypeMetadataEmbedding,
};
use oid4vc_providers::credential_signer::CredentialSigner;
use oid4vc_providers::identity_store::model::{IdentityRecord, PorRecord};
use oid4vc_providers::identity_store::IdentityStore;
use oid4vc_providers::image_renderer::error::RenderError;
use oid4vc_providers::image_renderer::{
    CredentialImageRenderer, PlaceholderValue, TemplateLoader, TemplateSource,
};
use oid4vc_providers::util::date_format::{format_localized, parse_date};
use serde_json::{json, Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::error::IssuanceError;
use crate::config::IssuerConfig;
use crate::credential_type::CredentialTypeConfig;
use crate::model::{
    CredentialRequest, CredentialView, CredentialViewRow, IssuanceSession, RawCredentialView,
};


/// Issues one credential type from the identity records of authenticated holders.
pub struct IssuanceService {
    credential_type: CredentialTypeConfig,
    issuer_url: String,
    typ: CredentialTyp,
    vctm_embedding: Option<TypeMetadataEmbedding>,
    locale: String,
    credential_supported_object: Value,
    identity_store: Arc<dyn IdentityStore>,
    signer: Arc<dyn CredentialSigner>,
    template_loader: Arc<dyn TemplateLoader>,
    renderer: Arc<dyn CredentialImageRenderer>,
}

impl IssuanceService {
    pub fn new(
        credential_type: CredentialTypeConfig,
        issuer: &IssuerConfig,
        identity_store: Arc<dyn IdentityStore>,
        signer: Arc<dyn CredentialSigner>,
        template_loader: Arc<dyn TemplateLoader>,
        renderer: Arc<dyn CredentialImageRenderer>,
    ) -> Self {
        Self {
            credential_supported_object: credential_type.export_credential_supported_object(issuer),
            credential_type,
            issuer_url: issuer.url.to_owned(),
            typ: issuer.typ,
            vctm_embedding: issuer.vctm_embedding,
            locale: issuer.locale.to_owned(),
            identity_store,
            signer,
            template_loader,
            renderer,
        }
    }

    pub fn credential_type(&self) -> &CredentialTypeConfig {
        &self.credential_type
    }

    pub fn credential_supported_object(&self) -> &Value {
        &self.credential_supported_object
    }

    pub async fn get_profile(
        &self,
        session: &IssuanceSession,
    ) -> Result<CredentialView, IssuanceError> {
        let record = self.lookup(session).await?;
        let por = &record.por;

        let rows = vec![
            row("Legal Name", &por.legal_name),
            row("Legal Person Identifier", &por.legal_person_identifier),
            row("Full Powers", &por.full_powers),
            row("Effective From", &por.effective_from_date),
            row(
                "Effective Until",
                por.effective_until_date.as_deref().unwrap_or_default(),
            ),
        ];

        let credential_image = self.render_preview(por).await?;

        Ok(CredentialView {
            credential_id: uuid::Uuid::new_v4().to_string(),
            credential_supported_object: self.credential_supported_object.clone(),
            view: RawCredentialView { rows },
            credential_image,
        })
    }

    /// Checks run in a fixed order: identity, profile, requested type, scope, then signing.
    pub async fn generate_credential_response(
        &self,
        session: &IssuanceSession,
        request: &CredentialRequest,
        holder_jwk: Option<PublicKeyJwk>,
    ) -> Result<IssuedCredential, IssuanceError> {
        let record = self.lookup(session).await?;

        let credential_type = &self.credential_type;
        if request.vct.as_deref() != Some(credential_type.get_id()) {
            return Err(IssuanceError::TypeMismatch {
                expected: credential_type.get_id().to_owned(),
                requested: request.vct.to_owned().unwrap_or_default(),
            });
        }

        if !session.has_scope(credential_type.get_scope()) {
            return Err(IssuanceError::ScopeDenied(
                credential_type.get_scope().to_owned(),
            ));
        }

        let jti = format!(
            "urn:credential:{}:{}",
            credential_type.get_scope(),
            uuid::Uuid::new_v4()
        );
        let payload = self.payload(&record.por, &jti, holder_jwk)?;
        let frame = credential_type.disclosure_frame(&payload)?;

        let mut header =
            CredentialHeader::new(self.typ).with_type_metadata(credential_type.metadata());
        if let Some(embedding) = self.vctm_embedding {
            header = header.with_embedding(embedding);
        }

        let issued = self.signer.sign(payload, header, &frame).await?;
        tracing::info!(credential_id = %jti, vct = %credential_type.get_id(), "credential issued");

        Ok(issued)
    }

    async fn lookup(&self, session: &IssuanceSession) -> Result<IdentityRecord, IssuanceError> {
        let query = session.identity_query()?;

        self.identity_store
            .find(&query)
            .await?
            .ok_or_else(|| {
                tracing::debug!("no single identity record matches the session");
                IssuanceError::ProfileNotFound
            })
    }

    fn payload(
        &self,
        por: &PorRecord,
        jti: &str,
        holder_jwk: Option<PublicKeyJwk>,
    ) -> Result<Map<String, Value>, IssuanceError> {
        let mut payload = Map::new();

        if let Some(jwk) = holder_jwk {
            payload.insert("cnf".to_owned(), json!({ "jwk": jwk }));
        }
        payload.insert("vct".to_owned(), json!(self.credential_type.get_id()));
        payload.insert("jti".to_owned(), json!(jti));
        payload.insert("iss".to_owned(), json!(self.issuer_url));
        payload.insert(
            "iat".to_owned(),
            json!(OffsetDateTime::now_utc().unix_timestamp()),
        );
        payload.insert(
            "legal_person_identifier".to_owned(),
            json!(por.legal_person_identifier),
        );
        payload.insert("legal_name".to_owned(), json!(por.legal_name));
        payload.insert("full_powers".to_owned(), json!(por.full_powers));

        let effective_from = iso_date("effective_from_date", &por.effective_from_date)?;
        payload.insert("issuing_date".to_owned(), json!(effective_from));
        payload.insert("effective_from_date".to_owned(), json!(effective_from));

        if let Some(until) = &por.effective_until_date {
            let effective_until = iso_date("effective_until_date", until)?;
            payload.insert("expiry_date".to_owned(), json!(effective_until));
            payload.insert("effective_until_date".to_owned(), json!(effective_until));
        }

        Ok(payload)
    }

    async fn render_preview(&self, por: &PorRecord) -> Result<String, IssuanceError> {
        let uri = self.credential_type.svg_template_uri.to_owned().ok_or_else(|| {
            IssuanceError::Render(RenderError::TemplateUnavailable(
                self.credential_type.get_id().to_owned(),
            ))
        })?;

        let template = self
            .template_loader
            .load(&TemplateSource::Uri { uri })
            .await?;

        let localized = |value: &str| {
            parse_date(value)
                .and_then(|date| format_localized(date, &self.locale))
                .unwrap_or_default()
        };

        let values = [
            PlaceholderValue::new("legal_name", por.legal_name.as_str()),
            PlaceholderValue::new(
                "legal_person_identifier",
                por.legal_person_identifier.as_str(),
            ),
            PlaceholderValue::new("full_powers", por.full_powers.as_str()),
            PlaceholderValue::new("effective_from_date", localized(&por.effective_from_date)),
            PlaceholderValue::new(
                "effective_until_date",
                por.effective_until_date
                    .as_deref()
                    .map(localized)
                    .unwrap_or_default(),
            ),
        ];

        Ok(self.renderer.render(&template, &values)?)
    }
}

fn row(name: &str, value: &str) -> CredentialViewRow {
    CredentialViewRow {
        name: name.to_owned(),
        value: value.to_owned(),
    }
}

/// `2024-03-01` -> `2024-03-01T00:00:00Z`
fn iso_date(field: &str, value: &str) -> Result<String, IssuanceError> {
    parse_date(value)
        .and_then(|date| date.midnight().assume_utc().format(&Rfc3339).ok())
        .ok_or_else(|| IssuanceError::InvalidRecord(format!("`{field}` is not a date: {value}")))
}
