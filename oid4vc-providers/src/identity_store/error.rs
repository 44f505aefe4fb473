use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityStoreError {
    #[error("Could not load identity records: `{0}`")]
    CouldNotLoad(String),
    #[error("Identity dataset is empty")]
    EmptyDataset,
}
