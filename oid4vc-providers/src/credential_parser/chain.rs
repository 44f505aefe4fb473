use std::sync::Arc;

use super::error::ParseError;
use super::imp::{mdoc::MdocParser, sd_jwt::SdJwtParser};
use super::{CredentialParser, ParseResult, RawPresentation};

/// A chain member. Built-in formats are plain variants, anything else goes through `Custom`.
#[derive(Clone)]
pub enum Parser {
    SdJwt(Arc<SdJwtParser>),
    Mdoc(Arc<MdocParser>),
    Custom(Arc<dyn CredentialParser>),
}

impl Parser {
    pub fn name(&self) -> &'static str {
        match self {
            Parser::SdJwt(_) => "SD_JWT",
            Parser::Mdoc(_) => "MDOC",
            Parser::Custom(_) => "CUSTOM",
        }
    }

    pub async fn parse(&self, raw: &RawPresentation) -> ParseResult {
        match self {
            Parser::SdJwt(parser) => parser.parse(raw).await,
            Parser::Mdoc(parser) => parser.parse(raw).await,
            Parser::Custom(parser) => parser.parse(raw).await,
        }
    }
}

/// Registration order is trial order.
#[derive(Clone, Default)]
pub struct ParserChain {
    parsers: Vec<Parser>,
}

impl ParserChain {
    pub fn new(parsers: Vec<Parser>) -> Self {
        Self { parsers }
    }

    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parsers.push(parser);
        self
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    pub async fn parse(&self, raw: &RawPresentation) -> ParseResult {
        for parser in &self.parsers {
            match parser.parse(raw).await {
                Ok(parsed) => {
                    tracing::debug!(
                        parser = parser.name(),
                        format = %parsed.claims.format(),
                        "presentation parsed"
                    );
                    return Ok(parsed);
                }
                Err(error) => {
                    tracing::debug!(parser = parser.name(), %error, "parser refused presentation");
                }
            }
        }

        tracing::warn!(parsers = self.parsers.len(), "no parser recognized the presentation");
        Err(ParseError::Unrecognized)
    }
}
