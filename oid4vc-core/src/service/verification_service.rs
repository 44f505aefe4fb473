use std::sync::Arc;

use oid4vc_crypto::CryptoProvider;
use oid4vc_providers::credential_parser::chain::ParserChain;
use oid4vc_providers::credential_parser::{ParsedCredential, RawPresentation};
use oid4vc_providers::key_resolver::chain::PublicKeyResolverChain;
use oid4vc_providers::presentation_definition::matcher::PresentationDefinitionMatcher;
use oid4vc_providers::presentation_definition::model::PresentationDefinition;

use super::error::VerificationError;
use crate::model::VerificationOutcome;


/// Presentation pipeline: parse, match against a definition, resolve the issuer key, then check
/// the signature.
pub struct VerificationService {
    parser_chain: ParserChain,
    resolver_chain: PublicKeyResolverChain,
    matcher: PresentationDefinitionMatcher,
    crypto: Arc<dyn CryptoProvider>,
    definitions: Vec<PresentationDefinition>,
    allowed_algorithms: Vec<String>,
}

impl VerificationService {
    pub fn new(
        parser_chain: ParserChain,
        resolver_chain: PublicKeyResolverChain,
        crypto: Arc<dyn CryptoProvider>,
        definitions: Vec<PresentationDefinition>,
        allowed_algorithms: Vec<String>,
    ) -> Self {
        Self {
            parser_chain,
            resolver_chain,
            matcher: PresentationDefinitionMatcher,
            crypto,
            definitions,
            allowed_algorithms,
        }
    }

    pub fn presentation_definitions(&self) -> &[PresentationDefinition] {
        &self.definitions
    }

    pub fn presentation_definition(
        &self,
        definition_id: &str,
    ) -> Result<&PresentationDefinition, VerificationError> {
        self.definitions
            .iter()
            .find(|definition| definition.id == definition_id)
            .ok_or_else(|| {
                VerificationError::UnknownPresentationDefinition(definition_id.to_owned())
            })
    }

    pub async fn verify(
        &self,
        raw: &RawPresentation,
        definition_id: &str,
    ) -> Result<VerificationOutcome, VerificationError> {
        let definition = self.presentation_definition(definition_id)?;
        self.verify_against(raw, definition).await
    }

    /// Verifies against a selectable definition narrowed to the fields the holder chose.
    pub async fn verify_selection(
        &self,
        raw: &RawPresentation,
        definition_id: &str,
        chosen_fields: &[String],
    ) -> Result<VerificationOutcome, VerificationError> {
        let definition = self.presentation_definition(definition_id)?;
        if !definition.selectable {
            return Err(VerificationError::NotSelectable(definition_id.to_owned()));
        }

        self.verify_against(raw, &definition.select(chosen_fields))
            .await
    }

    pub async fn verify_against(
        &self,
        raw: &RawPresentation,
        definition: &PresentationDefinition,
    ) -> Result<VerificationOutcome, VerificationError> {
        let parsed = self.parser_chain.parse(raw).await?;
        let outcome = self.matcher.matches(definition, &parsed.claims)?;

        if !outcome.accepted {
            tracing::info!(
                definition = %definition.id,
                missing = ?outcome.missing,
                "presentation rejected"
            );
            return Ok(VerificationOutcome {
                accepted: false,
                missing: outcome.missing,
                matched_descriptor: None,
                claims: parsed.claims,
                credential_image: parsed.credential_image,
                disclosed: vec![],
                key_binding: parsed.key_binding,
            });
        }

        self.check_signature(&parsed).await?;

        tracing::info!(
            definition = %definition.id,
            descriptor = outcome.matched_descriptor.as_deref().unwrap_or_default(),
            "presentation accepted"
        );

        Ok(VerificationOutcome {
            accepted: true,
            missing: outcome.missing,
            matched_descriptor: outcome.matched_descriptor,
            claims: parsed.claims,
            credential_image: parsed.credential_image,
            disclosed: outcome.disclosed,
            key_binding: parsed.key_binding,
        })
    }

    async fn check_signature(&self, parsed: &ParsedCredential) -> Result<(), VerificationError> {
        let signed = &parsed.signed;
        if !self
            .allowed_algorithms
            .iter()
            .any(|algorithm| algorithm == &signed.algorithm)
        {
            return Err(VerificationError::AlgorithmNotAllowed(
                signed.algorithm.to_owned(),
            ));
        }

        let key = self.resolver_chain.resolve(&parsed.issuer).await?;

        let signer = self
            .crypto
            .get_signer(&key.signer_algorithm_id)
            .map_err(|e| VerificationError::InvalidSignature(e.to_string()))?;

        signer
            .verify(&signed.signing_input, &signed.signature, &key.public_key)
            .map_err(|e| {
                tracing::warn!(source = %key.source, "credential signature does not verify");
                VerificationError::InvalidSignature(e.to_string())
            })
    }
}
