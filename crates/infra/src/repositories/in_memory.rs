//! In-memory backend for tests and single-node deployments.
//!
//! One store holds all four maps so [`BinsRepository::apply_batch`] can take
//! a single write lock and validate the whole write set before touching
//! anything; that is the in-memory equivalent of a SQL transaction.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use stockgrid_core::{ExpectedVersion, TenantId};
use stockgrid_warehouse::{Bin, BinId, ItemId, StockItem, Warehouse, WarehouseId, Zone, ZoneId};

use super::{
    BinBatch, BinsRepository, ItemsRepository, RepoResult, RepositoryError, WarehousesRepository,
    ZonesRepository,
};

fn poisoned() -> RepositoryError {
    RepositoryError::Storage("lock poisoned".to_string())
}

/// Tenant-isolated in-memory store implementing every warehouse repository.
#[derive(Debug, Default)]
pub struct InMemoryWarehouseStore {
    warehouses: RwLock<HashMap<(TenantId, WarehouseId), Warehouse>>,
    zones: RwLock<HashMap<(TenantId, ZoneId), Zone>>,
    bins: RwLock<HashMap<(TenantId, BinId), Bin>>,
    items: RwLock<HashMap<(TenantId, ItemId), StockItem>>,
}

impl InMemoryWarehouseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WarehousesRepository for InMemoryWarehouseStore {
    fn find_by_id(&self, tenant_id: TenantId, id: WarehouseId) -> RepoResult<Option<Warehouse>> {
        let map = self.warehouses.read().map_err(|_| poisoned())?;
        Ok(map.get(&(tenant_id, id)).cloned())
    }

    fn find_by_code(&self, tenant_id: TenantId, code: &str) -> RepoResult<Option<Warehouse>> {
        let map = self.warehouses.read().map_err(|_| poisoned())?;
        Ok(map
            .iter()
            .find(|((t, _), w)| *t == tenant_id && w.code() == code)
            .map(|(_, w)| w.clone()))
    }

    fn create(&self, warehouse: Warehouse) -> RepoResult<()> {
        let mut map = self.warehouses.write().map_err(|_| poisoned())?;
        let tenant_id = warehouse.tenant_id();
        if map
            .iter()
            .any(|((t, _), w)| *t == tenant_id && w.code() == warehouse.code())
        {
            return Err(RepositoryError::Conflict(format!(
                "warehouse code {:?} already exists",
                warehouse.code()
            )));
        }
        map.insert((tenant_id, warehouse.id_typed()), warehouse);
        Ok(())
    }
}

impl ZonesRepository for InMemoryWarehouseStore {
    fn find_by_id(&self, tenant_id: TenantId, id: ZoneId) -> RepoResult<Option<Zone>> {
        let map = self.zones.read().map_err(|_| poisoned())?;
        Ok(map.get(&(tenant_id, id)).cloned())
    }

    fn create(&self, zone: Zone) -> RepoResult<()> {
        let mut map = self.zones.write().map_err(|_| poisoned())?;
        let tenant_id = zone.tenant_id();
        if map.iter().any(|((t, _), z)| {
            *t == tenant_id && z.warehouse_id() == zone.warehouse_id() && z.code() == zone.code()
        }) {
            return Err(RepositoryError::Conflict(format!(
                "zone code {:?} already exists in warehouse {}",
                zone.code(),
                zone.warehouse_id()
            )));
        }
        map.insert((tenant_id, zone.id_typed()), zone);
        Ok(())
    }

    fn update(&self, zone: Zone) -> RepoResult<()> {
        let mut map = self.zones.write().map_err(|_| poisoned())?;
        let key = (zone.tenant_id(), zone.id_typed());
        if !map.contains_key(&key) {
            return Err(RepositoryError::NotFound(format!("zone {}", zone.id_typed())));
        }
        map.insert(key, zone);
        Ok(())
    }

    fn count_bins(&self, tenant_id: TenantId, zone_id: ZoneId) -> RepoResult<usize> {
        let map = self.bins.read().map_err(|_| poisoned())?;
        Ok(map
            .iter()
            .filter(|((t, _), b)| *t == tenant_id && b.zone_id() == zone_id)
            .count())
    }

    fn delete(&self, tenant_id: TenantId, zone_id: ZoneId) -> RepoResult<()> {
        let mut map = self.zones.write().map_err(|_| poisoned())?;
        map.remove(&(tenant_id, zone_id))
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("zone {zone_id}")))
    }
}

impl BinsRepository for InMemoryWarehouseStore {
    fn find_many_by_zone(&self, tenant_id: TenantId, zone_id: ZoneId) -> RepoResult<Vec<Bin>> {
        let map = self.bins.read().map_err(|_| poisoned())?;
        let mut bins: Vec<Bin> = map
            .iter()
            .filter(|((t, _), b)| *t == tenant_id && b.zone_id() == zone_id)
            .map(|(_, b)| b.clone())
            .collect();
        bins.sort_by(|a, b| a.address().cmp(b.address()));
        Ok(bins)
    }

    fn find_by_address(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
        address: &str,
    ) -> RepoResult<Option<Bin>> {
        let map = self.bins.read().map_err(|_| poisoned())?;
        Ok(map
            .iter()
            .find(|((t, _), b)| {
                *t == tenant_id && b.zone_id() == zone_id && b.address() == address
            })
            .map(|(_, b)| b.clone()))
    }

    fn create(&self, bin: Bin) -> RepoResult<()> {
        let mut map = self.bins.write().map_err(|_| poisoned())?;
        let tenant_id = bin.tenant_id();
        if map.iter().any(|((t, _), b)| {
            *t == tenant_id && b.zone_id() == bin.zone_id() && b.address() == bin.address()
        }) {
            return Err(RepositoryError::Conflict(format!(
                "address {:?} already exists in zone {}",
                bin.address(),
                bin.zone_id()
            )));
        }
        map.insert((tenant_id, bin.id_typed()), bin);
        Ok(())
    }

    fn update(&self, bin: Bin, expected: ExpectedVersion) -> RepoResult<()> {
        let mut map = self.bins.write().map_err(|_| poisoned())?;
        let key = (bin.tenant_id(), bin.id_typed());
        let stored = map
            .get(&key)
            .ok_or_else(|| RepositoryError::NotFound(format!("bin {}", bin.id_typed())))?;
        if !expected.matches(stored.version()) {
            return Err(RepositoryError::Conflict(format!(
                "bin {} moved on (expected {expected:?}, stored {})",
                bin.id_typed(),
                stored.version()
            )));
        }
        map.insert(key, bin);
        Ok(())
    }

    fn delete(&self, tenant_id: TenantId, bin_id: BinId) -> RepoResult<()> {
        let mut map = self.bins.write().map_err(|_| poisoned())?;
        map.remove(&(tenant_id, bin_id))
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("bin {bin_id}")))
    }

    fn count_items_in_bin(&self, tenant_id: TenantId, bin_id: BinId) -> RepoResult<usize> {
        let map = self.items.read().map_err(|_| poisoned())?;
        Ok(map
            .iter()
            .filter(|((t, _), i)| *t == tenant_id && i.bin_id() == Some(bin_id))
            .count())
    }

    fn count_items_per_bin(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
    ) -> RepoResult<HashMap<BinId, usize>> {
        let bins = self.bins.read().map_err(|_| poisoned())?;
        let zone_bins: HashSet<BinId> = bins
            .iter()
            .filter(|((t, _), b)| *t == tenant_id && b.zone_id() == zone_id)
            .map(|(_, b)| b.id_typed())
            .collect();

        let items = self.items.read().map_err(|_| poisoned())?;
        let mut counts = HashMap::new();
        for ((t, _), item) in items.iter() {
            if *t != tenant_id {
                continue;
            }
            if let Some(bin_id) = item.bin_id()
                && zone_bins.contains(&bin_id)
            {
                *counts.entry(bin_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    fn delete_by_zone(&self, tenant_id: TenantId, zone_id: ZoneId) -> RepoResult<usize> {
        let mut map = self.bins.write().map_err(|_| poisoned())?;
        let before = map.len();
        map.retain(|(t, _), b| !(*t == tenant_id && b.zone_id() == zone_id));
        Ok(before - map.len())
    }

    fn apply_batch(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
        batch: BinBatch,
    ) -> RepoResult<usize> {
        let mut map = self.bins.write().map_err(|_| poisoned())?;
        let mut items = self.items.write().map_err(|_| poisoned())?;

        // Validate the whole write set before mutating anything, so a
        // rejected batch leaves the store exactly as it was.
        let touched: HashSet<BinId> = batch
            .deletes
            .iter()
            .chain(batch.detaches.iter())
            .copied()
            .collect();
        for bin_id in &touched {
            if !map.contains_key(&(tenant_id, *bin_id)) {
                return Err(RepositoryError::NotFound(format!("bin {bin_id}")));
            }
        }
        for (bin, expected) in &batch.updates {
            let stored = map
                .get(&(tenant_id, bin.id_typed()))
                .ok_or_else(|| RepositoryError::NotFound(format!("bin {}", bin.id_typed())))?;
            if !expected.matches(stored.version()) {
                return Err(RepositoryError::Conflict(format!(
                    "bin {} moved on (expected {expected:?}, stored {})",
                    bin.id_typed(),
                    stored.version()
                )));
            }
        }

        let deleted: HashSet<BinId> = batch.deletes.iter().copied().collect();
        let updated: HashSet<BinId> = batch.updates.iter().map(|(b, _)| b.id_typed()).collect();
        let mut surviving: HashSet<String> = map
            .iter()
            .filter(|((t, _), b)| {
                *t == tenant_id
                    && b.zone_id() == zone_id
                    && !deleted.contains(&b.id_typed())
                    && !updated.contains(&b.id_typed())
            })
            .map(|(_, b)| b.address().to_string())
            .collect();
        surviving.extend(batch.updates.iter().map(|(b, _)| b.address().to_string()));
        for bin in &batch.creates {
            if !surviving.insert(bin.address().to_string()) {
                return Err(RepositoryError::Conflict(format!(
                    "address {:?} already exists in zone {zone_id}",
                    bin.address()
                )));
            }
        }

        let mut detached = 0;
        for bin_id in &batch.detaches {
            for ((t, _), item) in items.iter_mut() {
                if *t == tenant_id && item.bin_id() == Some(*bin_id) {
                    item.detach();
                    detached += 1;
                }
            }
        }
        for bin_id in &batch.deletes {
            map.remove(&(tenant_id, *bin_id));
        }
        for (bin, _) in batch.updates {
            map.insert((tenant_id, bin.id_typed()), bin);
        }
        for bin in batch.creates {
            map.insert((tenant_id, bin.id_typed()), bin);
        }
        Ok(detached)
    }
}

impl ItemsRepository for InMemoryWarehouseStore {
    fn create(&self, item: StockItem) -> RepoResult<()> {
        let mut map = self.items.write().map_err(|_| poisoned())?;
        map.insert((item.tenant_id(), item.id_typed()), item);
        Ok(())
    }

    fn find_by_bin(&self, tenant_id: TenantId, bin_id: BinId) -> RepoResult<Vec<StockItem>> {
        let map = self.items.read().map_err(|_| poisoned())?;
        Ok(map
            .iter()
            .filter(|((t, _), i)| *t == tenant_id && i.bin_id() == Some(bin_id))
            .map(|(_, i)| i.clone())
            .collect())
    }

    fn detach_from_bin(&self, tenant_id: TenantId, bin_id: BinId) -> RepoResult<usize> {
        let mut map = self.items.write().map_err(|_| poisoned())?;
        let mut detached = 0;
        for ((t, _), item) in map.iter_mut() {
            if *t == tenant_id && item.bin_id() == Some(bin_id) {
                item.detach();
                detached += 1;
            }
        }
        Ok(detached)
    }
}

#[cfg(test)]
mod tests {
    use stockgrid_core::EntityId;
    use stockgrid_warehouse::{PlannedBin, StructurePlanner, Warehouse, Zone, ZoneStructure};

    use super::*;

    fn store() -> InMemoryWarehouseStore {
        InMemoryWarehouseStore::new()
    }

    fn seed_zone(store: &InMemoryWarehouseStore, tenant_id: TenantId) -> (WarehouseId, ZoneId) {
        let warehouse = Warehouse::new(WarehouseId::new(EntityId::new()), tenant_id, "WH", "Main")
            .unwrap();
        let warehouse_id = warehouse.id_typed();
        WarehousesRepository::create(store, warehouse).unwrap();

        let zone = Zone::new(ZoneId::new(EntityId::new()), tenant_id, warehouse_id, "ZN", "Ambient")
            .unwrap();
        let zone_id = zone.id_typed();
        ZonesRepository::create(store, zone).unwrap();
        (warehouse_id, zone_id)
    }

    fn seed_bins(store: &InMemoryWarehouseStore, tenant_id: TenantId, zone_id: ZoneId) -> Vec<Bin> {
        let structure = ZoneStructure::uniform(1, 1, 3);
        let bins: Vec<Bin> = StructurePlanner::plan(&structure, "WH", "ZN")
            .unwrap()
            .iter()
            .map(|p| Bin::from_planned(BinId::new(EntityId::new()), tenant_id, zone_id, p))
            .collect();
        for bin in &bins {
            BinsRepository::create(store, bin.clone()).unwrap();
        }
        bins
    }

    #[test]
    fn duplicate_warehouse_code_conflicts() {
        let store = store();
        let tenant_id = TenantId::new();
        seed_zone(&store, tenant_id);

        let dup =
            Warehouse::new(WarehouseId::new(EntityId::new()), tenant_id, "WH", "Other").unwrap();
        let err = WarehousesRepository::create(&store, dup).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[test]
    fn same_code_different_tenant_is_fine() {
        let store = store();
        seed_zone(&store, TenantId::new());
        seed_zone(&store, TenantId::new());
    }

    #[test]
    fn find_many_by_zone_is_sorted_and_tenant_scoped() {
        let store = store();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();
        let (_, zone_a) = seed_zone(&store, tenant_a);
        let (_, zone_b) = seed_zone(&store, tenant_b);
        seed_bins(&store, tenant_a, zone_a);
        seed_bins(&store, tenant_b, zone_b);

        let bins = store.find_many_by_zone(tenant_a, zone_a).unwrap();
        assert_eq!(bins.len(), 3);
        assert!(bins.iter().all(|b| b.tenant_id() == tenant_a));
        let addresses: Vec<&str> = bins.iter().map(|b| b.address()).collect();
        let mut sorted = addresses.clone();
        sorted.sort();
        assert_eq!(addresses, sorted);
    }

    #[test]
    fn stale_version_update_conflicts() {
        let store = store();
        let tenant_id = TenantId::new();
        let (_, zone_id) = seed_zone(&store, tenant_id);
        let bins = seed_bins(&store, tenant_id, zone_id);

        let mut first = bins[0].clone();
        let loaded_at = first.version();
        first.add_occupancy(1).unwrap();
        BinsRepository::update(&store, first.clone(), ExpectedVersion::Exact(loaded_at)).unwrap();

        // A second writer still holding the old version must fail.
        let mut second = bins[0].clone();
        second.add_occupancy(2).unwrap();
        let err = BinsRepository::update(&store, second, ExpectedVersion::Exact(loaded_at))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[test]
    fn batch_update_with_stale_snapshot_conflicts() {
        let store = store();
        let tenant_id = TenantId::new();
        let (_, zone_id) = seed_zone(&store, tenant_id);
        let bins = seed_bins(&store, tenant_id, zone_id);

        // An item movement lands through the per-bin optimistic path.
        let mut moved = bins[0].clone();
        let loaded_at = moved.version();
        moved.add_occupancy(4).unwrap();
        BinsRepository::update(&store, moved, ExpectedVersion::Exact(loaded_at)).unwrap();

        // A reconfiguration still holding the pre-movement snapshot must not
        // clobber that write.
        let mut stale = bins[0].clone();
        stale.block("removed from structure").unwrap();
        let batch = BinBatch {
            updates: vec![(stale, ExpectedVersion::Exact(loaded_at))],
            ..BinBatch::default()
        };

        let err = store.apply_batch(tenant_id, zone_id, batch).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let stored = store
            .find_by_address(tenant_id, zone_id, bins[0].address())
            .unwrap()
            .unwrap();
        assert_eq!(stored.current_occupancy(), 4);
        assert!(!stored.is_blocked());
    }

    #[test]
    fn batch_detaches_items_in_the_same_unit() {
        let store = store();
        let tenant_id = TenantId::new();
        let (_, zone_id) = seed_zone(&store, tenant_id);
        let bins = seed_bins(&store, tenant_id, zone_id);
        let bin_id = bins[0].id_typed();

        for i in 0..3 {
            ItemsRepository::create(
                &store,
                StockItem::new(
                    ItemId::new(EntityId::new()),
                    tenant_id,
                    format!("SKU-{i}"),
                    Some(bin_id),
                ),
            )
            .unwrap();
        }

        let batch = BinBatch {
            deletes: vec![bin_id],
            detaches: vec![bin_id],
            ..BinBatch::default()
        };
        let detached = store.apply_batch(tenant_id, zone_id, batch).unwrap();

        assert_eq!(detached, 3);
        assert!(
            store
                .find_by_address(tenant_id, zone_id, bins[0].address())
                .unwrap()
                .is_none()
        );
        assert_eq!(store.count_items_in_bin(tenant_id, bin_id).unwrap(), 0);
    }

    #[test]
    fn rejected_batch_applies_no_detachments() {
        let store = store();
        let tenant_id = TenantId::new();
        let (_, zone_id) = seed_zone(&store, tenant_id);
        let bins = seed_bins(&store, tenant_id, zone_id);
        let bin_id = bins[0].id_typed();

        ItemsRepository::create(
            &store,
            StockItem::new(ItemId::new(EntityId::new()), tenant_id, "SKU-0", Some(bin_id)),
        )
        .unwrap();

        // A stale update elsewhere in the batch rejects the whole unit; the
        // detach intent must not have leaked through.
        let mut stale = bins[1].clone();
        stale.block("removed from structure").unwrap();
        let batch = BinBatch {
            updates: vec![(stale, ExpectedVersion::Exact(99))],
            deletes: vec![bin_id],
            detaches: vec![bin_id],
            ..BinBatch::default()
        };

        let err = store.apply_batch(tenant_id, zone_id, batch).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.count_items_in_bin(tenant_id, bin_id).unwrap(), 1);
        assert!(
            store
                .find_by_address(tenant_id, zone_id, bins[0].address())
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn rejected_batch_leaves_store_untouched() {
        let store = store();
        let tenant_id = TenantId::new();
        let (_, zone_id) = seed_zone(&store, tenant_id);
        let bins = seed_bins(&store, tenant_id, zone_id);

        // Delete one bin but also try to create a duplicate of a surviving
        // address; the whole batch must be rejected.
        let duplicate = Bin::from_planned(
            BinId::new(EntityId::new()),
            tenant_id,
            zone_id,
            &PlannedBin {
                aisle: 1,
                shelf: 1,
                position: 2,
                address: bins[1].address().to_string(),
            },
        );
        let batch = BinBatch {
            creates: vec![duplicate],
            deletes: vec![bins[0].id_typed()],
            ..BinBatch::default()
        };

        let err = store.apply_batch(tenant_id, zone_id, batch).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.find_many_by_zone(tenant_id, zone_id).unwrap().len(), 3);
    }

    #[test]
    fn batch_may_recreate_a_deleted_address() {
        let store = store();
        let tenant_id = TenantId::new();
        let (_, zone_id) = seed_zone(&store, tenant_id);
        let bins = seed_bins(&store, tenant_id, zone_id);

        let replacement = Bin::from_planned(
            BinId::new(EntityId::new()),
            tenant_id,
            zone_id,
            &PlannedBin {
                aisle: 1,
                shelf: 1,
                position: 1,
                address: bins[0].address().to_string(),
            },
        );
        let batch = BinBatch {
            creates: vec![replacement.clone()],
            deletes: vec![bins[0].id_typed()],
            ..BinBatch::default()
        };
        store.apply_batch(tenant_id, zone_id, batch).unwrap();

        let found = store
            .find_by_address(tenant_id, zone_id, bins[0].address())
            .unwrap()
            .unwrap();
        assert_eq!(found.id_typed(), replacement.id_typed());
    }

    #[test]
    fn detach_clears_bin_references_without_deleting_items() {
        let store = store();
        let tenant_id = TenantId::new();
        let (_, zone_id) = seed_zone(&store, tenant_id);
        let bins = seed_bins(&store, tenant_id, zone_id);
        let bin_id = bins[0].id_typed();

        for i in 0..4 {
            ItemsRepository::create(
                &store,
                StockItem::new(
                    ItemId::new(EntityId::new()),
                    tenant_id,
                    format!("SKU-{i}"),
                    Some(bin_id),
                ),
            )
            .unwrap();
        }
        assert_eq!(store.count_items_in_bin(tenant_id, bin_id).unwrap(), 4);

        let detached = store.detach_from_bin(tenant_id, bin_id).unwrap();
        assert_eq!(detached, 4);
        assert_eq!(store.count_items_in_bin(tenant_id, bin_id).unwrap(), 0);

        let counts = store.count_items_per_bin(tenant_id, zone_id).unwrap();
        assert!(counts.is_empty());
    }
}
