//! OpenID4VC issuance and presentation verification for an issuer that hands out
//! credentials to holders of a verified PID.
//!
//! The workspace consists of three crates:
//!
//! * **Crypto**: hashing and ES256 signing behind the `CryptoProvider` seam
//! * **Providers**: credential parsers and their chain, public key resolvers and their
//!   chain, the SD-JWT disclosure-policy signer, the presentation-definition matcher,
//!   credential image rendering and the identity record store
//! * **Core**: configuration and the services orchestrating the providers
//!
//! Initialize the core once from the deployment configuration:
//!
//! ```ignore rust
//! let core = Oid4vcCore::new(Some(config), Arc::new(ReqwestClient::default()), identity_store)?;
//!
//! let outcome = core
//!     .verification_service
//!     .verify(&presentation.into(), "vid")
//!     .await?;
//! let session = outcome.identity_session(&core.identity_field_mapping)?;
//!
//! let credential = core
//!     .issuance_service("urn:credential:por")
//!     .expect("configured credential type")
//!     .generate_credential_response(&session, &request, Some(holder_jwk))
//!     .await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use oid4vc_crypto::imp::hasher::sha256::SHA256;
use oid4vc_crypto::imp::signer::es256::ES256Signer;
use oid4vc_crypto::imp::{CryptoProviderImpl, ES256, SHA_256};
use oid4vc_crypto::CryptoProvider;
use oid4vc_providers::credential_parser::chain::{Parser, ParserChain};
use oid4vc_providers::credential_parser::imp::mdoc::{MdocParser, Params as MdocParams};
use oid4vc_providers::credential_parser::imp::sd_jwt::{Params as SdJwtParams, SdJwtParser};
use oid4vc_providers::credential_parser::ParserKind;
use oid4vc_providers::credential_signer::imp::internal::InternalSignatureProvider;
use oid4vc_providers::credential_signer::imp::sd_jwt::SdJwtCredentialSigner;
use oid4vc_providers::credential_signer::CredentialSigner;
use oid4vc_providers::http_client::HttpClient;
use oid4vc_providers::identity_store::IdentityStore;
use oid4vc_providers::image_renderer::imp::svg::SvgRenderer;
use oid4vc_providers::image_renderer::imp::template_loader::HttpTemplateLoader;
use oid4vc_providers::image_renderer::{CredentialImageRenderer, TemplateLoader};
use oid4vc_providers::key_algorithm::imp::es256::Es256;
use oid4vc_providers::key_algorithm::imp::provider::KeyAlgorithmProviderImpl;
use oid4vc_providers::key_algorithm::provider::KeyAlgorithmProvider;
use oid4vc_providers::key_algorithm::KeyAlgorithm;
use oid4vc_providers::key_resolver::chain::PublicKeyResolverChain;
use oid4vc_providers::key_resolver::imp::did::DidResolver;
use oid4vc_providers::key_resolver::imp::jwt_vc_issuer::JwtVcIssuerMetadataResolver;
use oid4vc_providers::key_resolver::imp::static_key::StaticKeyResolver;
use oid4vc_providers::key_resolver::imp::x5c::X5cResolver;
use oid4vc_providers::key_resolver::{PublicKeyResolver, ResolverKind};

use config::{CoreConfig, IdentityFieldMapping, VerifierConfig};
use service::error::CoreError;
use service::issuance_service::IssuanceService;
use service::verification_service::VerificationService;

pub mod config;
pub mod credential_type;
pub mod model;
pub mod service;

pub struct Oid4vcCore {
    pub verification_service: VerificationService,
    /// one per configured credential type; empty when no issuer key is configured
    pub issuance_services: Vec<IssuanceService>,
    pub identity_field_mapping: IdentityFieldMapping,
}

impl Oid4vcCore {
    pub fn new(
        config: Option<CoreConfig>,
        client: Arc<dyn HttpClient>,
        identity_store: Arc<dyn IdentityStore>,
    ) -> Result<Self, CoreError> {
        let config = config.unwrap_or_default();

        // initialize crypto provider
        let crypto_provider: Arc<dyn CryptoProvider> = Arc::new(CryptoProviderImpl::new(
            HashMap::from_iter(vec![(SHA_256.to_owned(), Arc::new(SHA256 {}) as _)]),
            HashMap::from_iter(vec![(ES256.to_owned(), Arc::new(ES256Signer {}) as _)]),
        ));

        // initialize key algorithm provider
        let key_algorithms: HashMap<String, Arc<dyn KeyAlgorithm>> =
            HashMap::from_iter(vec![(ES256.to_owned(), Arc::new(Es256) as _)]);
        let key_algorithm_provider: Arc<dyn KeyAlgorithmProvider> = Arc::new(
            KeyAlgorithmProviderImpl::new(key_algorithms, crypto_provider.clone()),
        );

        // credential images
        let template_loader: Arc<dyn TemplateLoader> = Arc::new(HttpTemplateLoader::new(
            client.clone(),
            config.verifier.template_loader.clone(),
        ));
        let renderer: Arc<dyn CredentialImageRenderer> = Arc::new(SvgRenderer);

        let parser_chain = parser_chain(
            &config.verifier,
            crypto_provider.clone(),
            template_loader.clone(),
            renderer.clone(),
        );
        let resolver_chain =
            resolver_chain(&config.verifier, client, key_algorithm_provider.clone())?;

        let verification_service = VerificationService::new(
            parser_chain,
            resolver_chain,
            crypto_provider.clone(),
            config.presentation_definitions,
            config.verifier.allowed_algorithms,
        );

        let issuance_services = match &config.issuer.key {
            None => {
                tracing::info!("no issuer key configured, issuance disabled");
                vec![]
            }
            Some(key) => {
                let signature_provider = InternalSignatureProvider::from_private_jwk(
                    key_algorithm_provider.as_ref(),
                    &key.algorithm,
                    &key.private_jwk,
                    key.key_id.to_owned(),
                )?;
                let signer: Arc<dyn CredentialSigner> = Arc::new(SdJwtCredentialSigner::new(
                    crypto_provider,
                    Arc::new(signature_provider),
                ));

                config
                    .credential_types
                    .into_iter()
                    .map(|credential_type| {
                        IssuanceService::new(
                            credential_type,
                            &config.issuer,
                            identity_store.clone(),
                            signer.clone(),
                            template_loader.clone(),
                            renderer.clone(),
                        )
                    })
                    .collect()
            }
        };

        Ok(Self {
            verification_service,
            issuance_services,
            identity_field_mapping: config.identity_field_mapping,
        })
    }

    pub fn issuance_service(&self, credential_type_id: &str) -> Option<&IssuanceService> {
        self.issuance_services
            .iter()
            .find(|service| service.credential_type().get_id() == credential_type_id)
    }
}

fn parser_chain(
    config: &VerifierConfig,
    crypto_provider: Arc<dyn CryptoProvider>,
    template_loader: Arc<dyn TemplateLoader>,
    renderer: Arc<dyn CredentialImageRenderer>,
) -> ParserChain {
    let mut sd_jwt_params = SdJwtParams::new(config.accepted_vcts.clone());
    sd_jwt_params.locale = config.locale.to_owned();
    sd_jwt_params.default_template = config.default_svg_template.clone();
    sd_jwt_params.template_origins = config.template_origins.clone();
    if let Some(date_claims) = &config.date_claims {
        sd_jwt_params.date_claims = date_claims.clone();
    }
    if let Some(expiry_claims) = &config.expiry_claims {
        sd_jwt_params.expiry_claims = expiry_claims.clone();
    }

    let parsers = config
        .parser_order
        .iter()
        .map(|kind| match kind {
            ParserKind::SdJwt => Parser::SdJwt(Arc::new(SdJwtParser::new(
                crypto_provider.clone(),
                template_loader.clone(),
                renderer.clone(),
                sd_jwt_params.clone(),
            ))),
            ParserKind::Mdoc => Parser::Mdoc(Arc::new(MdocParser::new(
                crypto_provider.clone(),
                MdocParams {
                    doc_type: config.mdoc_doc_type.to_owned(),
                    namespace: config.mdoc_namespace.to_owned(),
                    image_uri: config.mdoc_image_uri.to_owned(),
                },
            ))),
        })
        .collect();

    ParserChain::new(parsers)
}

fn resolver_chain(
    config: &VerifierConfig,
    client: Arc<dyn HttpClient>,
    key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
) -> Result<PublicKeyResolverChain, CoreError> {
    let resolvers = config
        .resolver_order
        .iter()
        .map(|kind| {
            let resolver: Arc<dyn PublicKeyResolver> = match kind {
                ResolverKind::StaticKey => Arc::new(StaticKeyResolver::new(
                    config.static_keys.clone(),
                    key_algorithm_provider.clone(),
                )),
                ResolverKind::Did => Arc::new(DidResolver::new(
                    key_algorithm_provider.clone(),
                    config.trusted_issuers.clone(),
                )),
                ResolverKind::JwtVcIssuerMetadata => Arc::new(JwtVcIssuerMetadataResolver::new(
                    client.clone(),
                    key_algorithm_provider.clone(),
                    config.jwt_vc_issuer.clone(),
                    config.trusted_issuers.clone(),
                )),
                ResolverKind::X5c => Arc::new(X5cResolver::from_pem(
                    &config.trusted_root_certificates,
                    key_algorithm_provider.clone(),
                )?),
            };
            Ok::<_, CoreError>(resolver)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PublicKeyResolverChain::new(resolvers))
}
