use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ct_codecs::{Base64, Decoder};
use serde::Deserialize;

use crate::http_client::HttpClient;
use crate::image_renderer::{error::RenderError, TemplateLoader, TemplateSource};

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

/// Fetches templates over HTTP; `data:` URIs and inline templates are resolved locally.
pub struct HttpTemplateLoader {
    client: Arc<dyn HttpClient>,
    params: Params,
}

impl HttpTemplateLoader {
    pub fn new(client: Arc<dyn HttpClient>, params: Params) -> Self {
        Self { client, params }
    }
}

#[async_trait::async_trait]
impl TemplateLoader for HttpTemplateLoader {
    async fn load(&self, source: &TemplateSource) -> Result<String, RenderError> {
        let uri = match source {
            TemplateSource::Inline { svg } => return Ok(svg.to_owned()),
            TemplateSource::Uri { uri } => uri,
        };

        if uri.starts_with("data:") {
            return decode_data_uri(uri);
        }

        let response = self
            .client
            .get(uri)
            .header("Accept", "image/svg+xml")
            .timeout(Duration::from_millis(self.params.timeout_ms))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| RenderError::TemplateUnavailable(format!("{uri}: {e}")))?;

        response
            .text()
            .map_err(|e| RenderError::InvalidTemplate(e.to_string()))
    }
}

/// Serves templates shipped with the deployment, keyed by URI.
#[derive(Default)]
pub struct StaticTemplateLoader {
    templates: HashMap<String, String>,
}

impl StaticTemplateLoader {
    pub fn new(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }
}

#[async_trait::async_trait]
impl TemplateLoader for StaticTemplateLoader {
    async fn load(&self, source: &TemplateSource) -> Result<String, RenderError> {
        match source {
            TemplateSource::Inline { svg } => Ok(svg.to_owned()),
            TemplateSource::Uri { uri } if uri.starts_with("data:") => decode_data_uri(uri),
            TemplateSource::Uri { uri } => self
                .templates
                .get(uri)
                .cloned()
                .ok_or_else(|| RenderError::TemplateUnavailable(uri.to_owned())),
        }
    }
}

fn decode_data_uri(uri: &str) -> Result<String, RenderError> {
    let (metadata, data) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| RenderError::InvalidTemplate("malformed data URI".to_owned()))?;

    if metadata.ends_with(";base64") {
        let bytes = Base64::decode_to_vec(data, None)
            .map_err(|e| RenderError::InvalidTemplate(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| RenderError::InvalidTemplate(e.to_string()))
    } else {
        Ok(data.to_owned())
    }
}
