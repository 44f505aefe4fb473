//! Keys pinned in configuration, matched by issuer and/or key id.

use std::sync::Arc;

use serde::Deserialize;

use super::key_material_from_jwk;
use crate::common_models::PublicKeyJwk;
use crate::key_algorithm::provider::KeyAlgorithmProvider;
use crate::key_resolver::{
    error::ResolverError, IssuerMetadata, KeyMaterial, PublicKeyResolver, ResolverKind,
};


#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticKeyEntry {
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub key_id: Option<String>,
    pub jwk: PublicKeyJwk,
}

impl StaticKeyEntry {
    fn matches(&self, issuer: &IssuerMetadata) -> bool {
        let issuer_matches = match &self.issuer {
            None => true,
            Some(expected) => issuer.issuer.as_ref() == Some(expected),
        };

        let key_id_matches = match self.key_id.as_deref().or(self.jwk.key_id()) {
            None => true,
            Some(expected) => issuer.key_id.as_deref() == Some(expected),
        };

        issuer_matches && key_id_matches
    }
}

pub struct StaticKeyResolver {
    keys: Vec<StaticKeyEntry>,
    key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
}

impl StaticKeyResolver {
    pub fn new(
        keys: Vec<StaticKeyEntry>,
        key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
    ) -> Self {
        Self {
            keys,
            key_algorithm_provider,
        }
    }
}

#[async_trait::async_trait]
impl PublicKeyResolver for StaticKeyResolver {
    fn kind(&self) -> ResolverKind {
        ResolverKind::StaticKey
    }

    async fn resolve(&self, issuer: &IssuerMetadata) -> Result<KeyMaterial, ResolverError> {
        let entry = self
            .keys
            .iter()
            .find(|entry| entry.matches(issuer))
            .ok_or_else(|| {
                ResolverError::KeyNotFound(format!(
                    "no pinned key for issuer `{}` / kid `{}`",
                    issuer.issuer.as_deref().unwrap_or("-"),
                    issuer.key_id.as_deref().unwrap_or("-"),
                ))
            })?;

        key_material_from_jwk(
            self.key_algorithm_provider.as_ref(),
            &entry.jwk,
            issuer,
            self.kind(),
        )
    }
}
