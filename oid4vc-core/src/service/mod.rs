pub mod error;
pub mod issuance_service;
pub mod verification_service;
