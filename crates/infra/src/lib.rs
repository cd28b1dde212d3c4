//! `stockgrid-infra` — storage seam and orchestration for the warehouse
//! domain.
//!
//! - [`repositories`]: tenant-scoped repository traits plus the in-memory
//!   backend used for tests and single-node deployments
//! - [`services`]: the application services that compose repositories, the
//!   pure planner/differ, and the event bus into the operations the API
//!   layer exposes

pub mod repositories;
pub mod services;

#[cfg(test)]
mod integration_tests;

pub use repositories::{
    BinBatch, BinsRepository, InMemoryWarehouseStore, ItemsRepository, RepoResult,
    RepositoryError, WarehousesRepository, ZonesRepository,
};
pub use services::{
    AddressService, ConfigureStructureResult, ProvisioningService, ServiceError,
    ZoneDeletionOutcome, ZoneStructureService,
};
