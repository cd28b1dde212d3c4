//! Application services: the operations the API layer exposes.
//!
//! Services compose repositories, the pure planner/differ, and the event
//! bus. Error mapping is centralized in [`ServiceError`]: deterministic
//! domain failures and storage failures stay distinguishable so the API
//! layer can map them to status codes.

pub mod addressing;
pub mod provisioning;
pub mod zone_structure;

pub use addressing::AddressService;
pub use provisioning::ProvisioningService;
pub use zone_structure::{ConfigureStructureResult, ZoneDeletionOutcome, ZoneStructureService};

use thiserror::Error;

use stockgrid_core::DomainError;

use crate::repositories::RepositoryError;

/// Failure of a service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Deterministic domain failure (validation, invariant, conflict).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The storage backend failed or rejected the write.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Whether retrying the same request could succeed (storage hiccups and
    /// optimistic-concurrency conflicts; never validation failures).
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Domain(DomainError::Conflict(_)) => true,
            ServiceError::Domain(_) => false,
            ServiceError::Repository(RepositoryError::NotFound(_)) => false,
            ServiceError::Repository(_) => true,
        }
    }
}
