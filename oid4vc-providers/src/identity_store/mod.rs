//! Lookup of the subject records an issuer signs credentials from.

use error::IdentityStoreError;
use model::{IdentityQuery, IdentityRecord};

pub mod error;
pub mod imp;
pub mod model;


#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    /// Returns the single record matching `query`; no match and ambiguous matches both yield
    /// `None`.
    async fn find(
        &self,
        query: &IdentityQuery,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError>;
}
