use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::http_client::{
    Headers, HttpClient, HttpClientError, RequestBuilder, Response, StatusCode,
};

#[derive(Clone, Default)]
pub struct ReqwestClient {
    pub client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(Arc::new(self.clone()), url)
    }

    async fn send(
        &self,
        url: &str,
        headers: Option<Headers>,
        timeout: Option<Duration>,
    ) -> Result<Response, HttpClientError> {
        let mut builder = self.client.get(url);

        if let Some(headers) = headers {
            builder = builder.headers(to_header_map(headers)?);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        tracing::debug!(%url, "sending GET request");

        let response = builder
            .send()
            .await
            .map_err(|e| HttpClientError::HttpError(e.to_string()))?;

        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                let value = v.to_str().map_err(|e| HttpClientError::Other(e.to_string()))?;

                Ok((k.to_string(), value.to_string()))
            })
            .collect::<Result<Headers, HttpClientError>>()?;
        let status = StatusCode(response.status().as_u16());
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpClientError::HttpError(e.to_string()))?;

        Ok(Response {
            body: body.to_vec(),
            headers,
            status,
        })
    }
}

fn to_header_map(headers: HashMap<String, String>) -> Result<HeaderMap, HttpClientError> {
    headers
        .into_iter()
        .map(|(k, v)| {
            let name = HeaderName::from_str(k.as_str())
                .map_err(|e| HttpClientError::Other(e.to_string()))?;
            let value = HeaderValue::from_str(v.as_str())
                .map_err(|e| HttpClientError::Other(e.to_string()))?;

            Ok((name, value))
        })
        .collect()
}
