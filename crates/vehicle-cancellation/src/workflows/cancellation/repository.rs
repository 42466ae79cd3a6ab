use super::domain::{RequestId, VehicleRequest};

/// Storage abstraction so the register can run against any backing store.
pub trait RequestRepository: Send + Sync {
    fn insert(&self, request: VehicleRequest) -> Result<VehicleRequest, RepositoryError>;
    fn update(&self, request: VehicleRequest) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &RequestId) -> Result<Option<VehicleRequest>, RepositoryError>;
    fn delete(&self, id: &RequestId) -> Result<(), RepositoryError>;
    fn list(&self) -> Result<Vec<VehicleRequest>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
