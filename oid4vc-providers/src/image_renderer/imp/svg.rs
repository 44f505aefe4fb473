use std::collections::HashMap;

use ct_codecs::{Base64, Encoder};

use crate::image_renderer::{error::RenderError, CredentialImageRenderer, PlaceholderValue};

pub const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    pub fn fill(template: &str, values: &[PlaceholderValue]) -> Result<String, RenderError> {
        let values: HashMap<&str, &str> = values
            .iter()
            .map(|v| (v.placeholder.as_str(), v.value.as_str()))
            .collect();

        let mut output = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find(OPEN) {
            output.push_str(&rest[..start]);
            let after_open = &rest[start + OPEN.len()..];

            let end = after_open.find(CLOSE).ok_or_else(|| {
                RenderError::InvalidTemplate("unterminated placeholder".to_owned())
            })?;

            let name = after_open[..end].trim();
            if let Some(value) = values.get(name) {
                output.push_str(&escape_xml(value));
            }

            rest = &after_open[end + CLOSE.len()..];
        }
        output.push_str(rest);

        Ok(output)
    }
}

impl CredentialImageRenderer for SvgRenderer {
    fn render(&self, template: &str, values: &[PlaceholderValue]) -> Result<String, RenderError> {
        let svg = Self::fill(template, values)?;

        let encoded = Base64::encode_to_string(svg.as_bytes())
            .map_err(|e| RenderError::Encoding(e.to_string()))?;

        Ok(format!("{SVG_DATA_URI_PREFIX}{encoded}"))
    }
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
