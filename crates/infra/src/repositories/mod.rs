//! Repository seam between the warehouse domain and storage.
//!
//! All access is tenant-scoped: every method takes the [`TenantId`] it
//! operates under, and no call can observe another tenant's rows. The
//! in-memory backend lives in [`in_memory`]; a SQL backend would implement
//! the same traits, with [`BinsRepository::apply_batch`] mapping to a single
//! transaction.

mod in_memory;

pub use in_memory::InMemoryWarehouseStore;

use std::collections::HashMap;

use thiserror::Error;

use stockgrid_core::{ExpectedVersion, TenantId};
use stockgrid_warehouse::{Bin, BinId, StockItem, Warehouse, WarehouseId, Zone, ZoneId};

/// Storage-level error.
///
/// Domain validation never lands here; repositories only report uniqueness /
/// concurrency conflicts, missing rows, and backend failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Uniqueness or optimistic-concurrency violation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The addressed row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend itself failed (poisoned lock, lost connection, ...).
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// The write set of one structure reconfiguration.
///
/// Applied as a unit by [`BinsRepository::apply_batch`]: either every
/// create, update, delete and item detachment lands, or none of them do.
/// Each update carries the [`ExpectedVersion`] it was computed against, so
/// a bin mutated concurrently (item movement through
/// [`BinsRepository::update`]) fails the whole batch instead of being
/// overwritten by a stale snapshot.
#[derive(Debug, Clone, Default)]
pub struct BinBatch {
    pub creates: Vec<Bin>,
    pub updates: Vec<(Bin, ExpectedVersion)>,
    pub deletes: Vec<BinId>,
    /// Bins whose items must be detached in the same unit (forced removal
    /// of occupied bins).
    pub detaches: Vec<BinId>,
}

impl BinBatch {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty()
            && self.updates.is_empty()
            && self.deletes.is_empty()
            && self.detaches.is_empty()
    }
}

/// Warehouse persistence.
pub trait WarehousesRepository: Send + Sync {
    fn find_by_id(&self, tenant_id: TenantId, id: WarehouseId) -> RepoResult<Option<Warehouse>>;

    fn find_by_code(&self, tenant_id: TenantId, code: &str) -> RepoResult<Option<Warehouse>>;

    /// Insert a new warehouse. The code must be unique within the tenant.
    fn create(&self, warehouse: Warehouse) -> RepoResult<()>;
}

/// Zone persistence.
pub trait ZonesRepository: Send + Sync {
    fn find_by_id(&self, tenant_id: TenantId, id: ZoneId) -> RepoResult<Option<Zone>>;

    /// Insert a new zone. The code must be unique within its warehouse.
    fn create(&self, zone: Zone) -> RepoResult<()>;

    fn update(&self, zone: Zone) -> RepoResult<()>;

    /// Number of bins currently persisted for the zone (deletion guard).
    fn count_bins(&self, tenant_id: TenantId, zone_id: ZoneId) -> RepoResult<usize>;

    fn delete(&self, tenant_id: TenantId, zone_id: ZoneId) -> RepoResult<()>;
}

/// Bin persistence.
pub trait BinsRepository: Send + Sync {
    /// Every bin in the zone, ordered by address for deterministic plans.
    fn find_many_by_zone(&self, tenant_id: TenantId, zone_id: ZoneId) -> RepoResult<Vec<Bin>>;

    fn find_by_address(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
        address: &str,
    ) -> RepoResult<Option<Bin>>;

    /// Insert a new bin. The address must be unique within its zone.
    fn create(&self, bin: Bin) -> RepoResult<()>;

    /// Overwrite a bin, checking `expected` against the *stored* version.
    /// Callers pass the version they loaded, not the one they mutated to.
    fn update(&self, bin: Bin, expected: ExpectedVersion) -> RepoResult<()>;

    fn delete(&self, tenant_id: TenantId, bin_id: BinId) -> RepoResult<()>;

    fn count_items_in_bin(&self, tenant_id: TenantId, bin_id: BinId) -> RepoResult<usize>;

    /// Item counts for every occupied bin in the zone (bins without items
    /// are absent from the map).
    fn count_items_per_bin(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
    ) -> RepoResult<HashMap<BinId, usize>>;

    /// Remove every bin in the zone, returning how many were removed.
    fn delete_by_zone(&self, tenant_id: TenantId, zone_id: ZoneId) -> RepoResult<usize>;

    /// Apply a reconfiguration write set atomically, returning how many
    /// items the batch's detach intents cleared. Version mismatches on
    /// updates reject the whole batch with `Conflict`.
    fn apply_batch(&self, tenant_id: TenantId, zone_id: ZoneId, batch: BinBatch)
    -> RepoResult<usize>;
}

/// Stock-item persistence (the slice reconfiguration needs).
pub trait ItemsRepository: Send + Sync {
    fn create(&self, item: StockItem) -> RepoResult<()>;

    fn find_by_bin(&self, tenant_id: TenantId, bin_id: BinId) -> RepoResult<Vec<StockItem>>;

    /// Clear the bin reference on every item stored in `bin_id`, returning
    /// how many items were detached. Items are never deleted here.
    fn detach_from_bin(&self, tenant_id: TenantId, bin_id: BinId) -> RepoResult<usize>;
}
