//! Declarative field constraints a verifier places on presented claims.
//
// https://identity.foundation/presentation-exchange/spec/v2.0.0/

pub mod error;
pub mod matcher;
pub mod model;
