//! Personalized credential images: SVG templates with `{{placeholder}}` slots.

use serde::{Deserialize, Serialize};

use error::RenderError;

pub mod error;
pub mod imp;

#[cfg(test)]
mod test;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderValue {
    pub placeholder: String,
    pub value: String,
}

impl PlaceholderValue {
    pub fn new(placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            value: value.into(),
        }
    }
}

/// Where an SVG template comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TemplateSource {
    Uri { uri: String },
    Inline { svg: String },
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait CredentialImageRenderer: Send + Sync {
    /// Fills the template and returns it as a data URI.
    ///
    /// Placeholders without a value are replaced with the empty string.
    fn render(&self, template: &str, values: &[PlaceholderValue]) -> Result<String, RenderError>;
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait TemplateLoader: Send + Sync {
    async fn load(&self, source: &TemplateSource) -> Result<String, RenderError>;
}
