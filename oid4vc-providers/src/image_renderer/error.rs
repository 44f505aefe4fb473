use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Template unavailable: `{0}`")]
    TemplateUnavailable(String),
    #[error("Invalid template: `{0}`")]
    InvalidTemplate(String),
    #[error("Could not encode image: `{0}`")]
    Encoding(String),
}
