//! Keys published by a trusted HTTPS issuer under `/.well-known/jwt-vc-issuer`.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{key_material_from_jwk, trusted_issuer};
use crate::common_models::PublicKeyJwk;
use crate::http_client::HttpClient;
use crate::key_algorithm::provider::KeyAlgorithmProvider;
use crate::key_resolver::{
    error::ResolverError, IssuerMetadata, KeyMaterial, PublicKeyResolver, ResolverKind,
};

#[cfg(test)]
mod test;

const WELL_KNOWN_PATH: &str = "/.well-known/jwt-vc-issuer";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for Params {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IssuerMetadataDocument {
    issuer: String,
    #[serde(default)]
    jwks: Option<JwkSet>,
    #[serde(default)]
    jwks_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Value>,
}

pub struct JwtVcIssuerMetadataResolver {
    client: Arc<dyn HttpClient>,
    key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
    params: Params,
    trusted_issuers: Vec<String>,
}

impl JwtVcIssuerMetadataResolver {
    pub fn new(
        client: Arc<dyn HttpClient>,
        key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
        params: Params,
        trusted_issuers: Vec<String>,
    ) -> Self {
        Self {
            client,
            key_algorithm_provider,
            params,
            trusted_issuers,
        }
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ResolverError> {
        self.client
            .get(url)
            .header("Accept", "application/json")
            .timeout(Duration::from_millis(self.params.timeout_ms))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json())
            .map_err(|e| ResolverError::Http(format!("{url}: {e}")))
    }
}

/// `https://issuer.example/tenant` -> `https://issuer.example/.well-known/jwt-vc-issuer/tenant`
pub fn well_known_url(issuer: &str) -> Result<Url, ResolverError> {
    let mut url = Url::parse(issuer)
        .map_err(|e| ResolverError::NotApplicable(format!("issuer is not a URL: {e}")))?;

    if !matches!(url.scheme(), "https" | "http") {
        return Err(ResolverError::NotApplicable(format!(
            "unsupported issuer scheme `{}`",
            url.scheme()
        )));
    }

    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{WELL_KNOWN_PATH}{path}"));
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

fn same_origin(metadata_url: &Url, jwks_uri: &str) -> Result<(), ResolverError> {
    let jwks_url = Url::parse(jwks_uri)
        .map_err(|e| ResolverError::KeyNotFound(format!("invalid `jwks_uri`: {e}")))?;

    if jwks_url.origin() != metadata_url.origin() {
        return Err(ResolverError::UntrustedIssuer(format!(
            "`jwks_uri` `{jwks_uri}` is not served by the issuer"
        )));
    }

    Ok(())
}

fn select_key(keys: Vec<Value>, key_id: Option<&str>) -> Result<PublicKeyJwk, ResolverError> {
    let mut keys: Vec<PublicKeyJwk> = keys
        .into_iter()
        .filter_map(|key| serde_json::from_value(key).ok())
        .filter(|key: &PublicKeyJwk| key.get_use() != Some("enc"))
        .collect();

    match key_id {
        Some(kid) => keys
            .into_iter()
            .find(|key| key.key_id() == Some(kid))
            .ok_or_else(|| ResolverError::KeyNotFound(format!("no key with kid `{kid}`"))),
        None if keys.len() == 1 => Ok(keys.remove(0)),
        None => Err(ResolverError::KeyNotFound(format!(
            "{} candidate keys and no kid",
            keys.len()
        ))),
    }
}

#[async_trait::async_trait]
impl PublicKeyResolver for JwtVcIssuerMetadataResolver {
    fn kind(&self) -> ResolverKind {
        ResolverKind::JwtVcIssuerMetadata
    }

    async fn resolve(&self, issuer: &IssuerMetadata) -> Result<KeyMaterial, ResolverError> {
        let iss = trusted_issuer(issuer, &self.trusted_issuers)?;

        let url = well_known_url(iss)?;
        let metadata: IssuerMetadataDocument = self.fetch(url.as_str()).await?;

        if metadata.issuer != iss {
            return Err(ResolverError::KeyNotFound(format!(
                "metadata issuer `{}` does not match `{iss}`",
                metadata.issuer
            )));
        }

        let jwks = match (metadata.jwks, metadata.jwks_uri) {
            (Some(jwks), _) => jwks,
            (None, Some(jwks_uri)) => {
                same_origin(&url, &jwks_uri)?;
                self.fetch(&jwks_uri).await?
            }
            (None, None) => {
                return Err(ResolverError::KeyNotFound(
                    "issuer metadata publishes no keys".to_owned(),
                ))
            }
        };

        let jwk = select_key(jwks.keys, issuer.key_id.as_deref())?;

        key_material_from_jwk(
            self.key_algorithm_provider.as_ref(),
            &jwk,
            issuer,
            self.kind(),
        )
    }
}
