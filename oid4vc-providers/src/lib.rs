//! Pluggable providers for OpenID4VC credential issuance and presentation verification.
//!
//! Each provider lives behind a trait so deployments can reorder or replace
//! implementations (credential parsers, public key resolvers, template loaders)
//! without touching call sites.

pub mod common_models;
pub mod credential_parser;
pub mod credential_signer;
pub mod http_client;
pub mod identity_store;
pub mod image_renderer;
pub mod jwt;
pub mod key_algorithm;
pub mod key_resolver;
pub mod presentation_definition;
pub mod util;
