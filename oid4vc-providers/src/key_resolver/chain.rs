use std::sync::Arc;

use super::{error::KeyResolutionError, IssuerMetadata, KeyMaterial, PublicKeyResolver};

/// Ordered resolvers; registration order is trial order.
#[derive(Clone, Default)]
pub struct PublicKeyResolverChain {
    resolvers: Vec<Arc<dyn PublicKeyResolver>>,
}

impl PublicKeyResolverChain {
    pub fn new(resolvers: Vec<Arc<dyn PublicKeyResolver>>) -> Self {
        Self { resolvers }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn PublicKeyResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub async fn resolve(
        &self,
        issuer: &IssuerMetadata,
    ) -> Result<KeyMaterial, KeyResolutionError> {
        let mut attempts = Vec::with_capacity(self.resolvers.len());

        for resolver in &self.resolvers {
            let kind = resolver.kind();
            match resolver.resolve(issuer).await {
                Ok(key) => {
                    tracing::debug!(resolver = %kind, "issuer key resolved");
                    return Ok(key);
                }
                Err(error) => {
                    tracing::debug!(resolver = %kind, %error, "resolver failed, trying next");
                    attempts.push(format!("{kind}: {error}"));
                }
            }
        }

        tracing::warn!(
            issuer = issuer.issuer.as_deref().unwrap_or_default(),
            "no resolver produced issuer key material"
        );
        Err(KeyResolutionError::KeyResolutionFailed { attempts })
    }
}
