//! Zone structure configuration and deletion.
//!
//! The write path for everything that changes a zone's bin population.
//! Reconfigurations of the same zone are serialized: the service holds a
//! per-zone guard across plan + apply, so two concurrent requests cannot
//! interleave their derived bin sets. The resulting write set goes through
//! [`BinsRepository::apply_batch`] as a unit.
//!
//! Event publication is best-effort. State is committed before anything is
//! published, and a bus failure is logged, never surfaced.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use stockgrid_core::{DomainError, EntityId, ExpectedVersion, TenantId};
use stockgrid_events::{EventBus, EventEnvelope};
use stockgrid_warehouse::events::{BinBlocked, ItemsDetached, ZoneDeleted, ZoneStructureConfigured};
use stockgrid_warehouse::reconfig::{self, ReconfigurationFlags, ReconfigurationPlan};
use stockgrid_warehouse::{
    Bin, BinId, ReconfigurationOutcome, ReconfigurationPreview, StructurePlanner, StructurePreview,
    Warehouse, WarehouseEvent, Zone, ZoneId, ZoneLayout, ZoneStructure,
};

use crate::repositories::{
    BinBatch, BinsRepository, ItemsRepository, WarehousesRepository, ZonesRepository,
};
use crate::services::ServiceError;

/// Response of [`ZoneStructureService::configure_structure`].
#[derive(Debug)]
pub enum ConfigureStructureResult {
    /// `regenerate_bins == false`: counts only, storage untouched.
    Preview(ReconfigurationPreview),
    /// The reconfiguration was executed.
    Applied {
        zone: Zone,
        outcome: ReconfigurationOutcome,
    },
}

/// Counts returned by [`ZoneStructureService::delete_zone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneDeletionOutcome {
    pub bins_deleted: usize,
    pub items_detached: usize,
}

type ZoneGuard = Arc<Mutex<()>>;

/// Orchestrates structure previews, reconfigurations, and zone deletion.
pub struct ZoneStructureService<B> {
    warehouses: Arc<dyn WarehousesRepository>,
    zones: Arc<dyn ZonesRepository>,
    bins: Arc<dyn BinsRepository>,
    items: Arc<dyn ItemsRepository>,
    bus: B,
    zone_guards: Mutex<HashMap<(TenantId, ZoneId), ZoneGuard>>,
}

impl<B> ZoneStructureService<B>
where
    B: EventBus<EventEnvelope<WarehouseEvent>>,
{
    pub fn new(
        warehouses: Arc<dyn WarehousesRepository>,
        zones: Arc<dyn ZonesRepository>,
        bins: Arc<dyn BinsRepository>,
        items: Arc<dyn ItemsRepository>,
        bus: B,
    ) -> Self {
        Self {
            warehouses,
            zones,
            bins,
            items,
            bus,
            zone_guards: Mutex::new(HashMap::new()),
        }
    }

    /// Totals and sample addresses for a structure, without touching bins.
    pub fn preview_structure(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
        structure: &ZoneStructure,
    ) -> Result<StructurePreview, ServiceError> {
        let (zone, warehouse) = self.load_zone(tenant_id, zone_id)?;
        Ok(StructurePlanner::preview(
            structure,
            warehouse.code(),
            zone.code(),
        )?)
    }

    /// Dry-run diff of `structure` against the zone's persisted bins.
    pub fn preview_reconfiguration(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
        structure: &ZoneStructure,
    ) -> Result<ReconfigurationPreview, ServiceError> {
        let guard = self.zone_guard(tenant_id, zone_id);
        let _held = lock(&guard);
        let (_, _, _, plan) = self.compute_plan(tenant_id, zone_id, structure)?;
        Ok(plan.preview())
    }

    /// Configure (or reconfigure) the zone's structure.
    ///
    /// With `flags.regenerate_bins == false` this is a pure preview. With it
    /// set, the derived bin changes are applied as one batch, the structure
    /// is stored on the zone, and events are published.
    ///
    /// Occupied bins that fall out of the structure are blocked; with
    /// `flags.force_remove_occupied` their items are detached (never
    /// deleted) and the bins removed.
    pub fn configure_structure(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
        structure: ZoneStructure,
        flags: ReconfigurationFlags,
    ) -> Result<ConfigureStructureResult, ServiceError> {
        let guard = self.zone_guard(tenant_id, zone_id);
        let _held = lock(&guard);

        let (mut zone, _, current, plan) = self.compute_plan(tenant_id, zone_id, &structure)?;
        if !flags.regenerate_bins {
            return Ok(ConfigureStructureResult::Preview(plan.preview()));
        }

        let by_id: HashMap<BinId, &Bin> = current.iter().map(|b| (b.id_typed(), b)).collect();
        let mut batch = BinBatch::default();
        let mut events: Vec<WarehouseEvent> = Vec::new();

        // Every batched update states the version it was planned against;
        // a bin an item movement touched in between fails the whole batch.
        for update in &plan.update {
            let mut bin = cloned(&by_id, update.bin_id)?;
            let planned_against = ExpectedVersion::Exact(bin.version());
            bin.reposition(update.aisle, update.shelf, update.position);
            batch.updates.push((bin, planned_against));
        }
        batch
            .deletes
            .extend(plan.delete_empty.iter().map(|b| b.bin_id));

        let mut blocked_bins = Vec::new();
        for occupied in &plan.occupied {
            if flags.force_remove_occupied {
                // Detachment rides in the batch so it commits (or fails)
                // together with the bin deletion.
                batch.detaches.push(occupied.bin_id);
                batch.deletes.push(occupied.bin_id);
                events.push(WarehouseEvent::ItemsDetached(ItemsDetached {
                    tenant_id,
                    zone_id,
                    bin_id: occupied.bin_id,
                    item_count: occupied.item_count,
                    occurred_at: Utc::now(),
                }));
                continue;
            }

            let mut bin = cloned(&by_id, occupied.bin_id)?;
            if !bin.is_blocked() {
                let planned_against = ExpectedVersion::Exact(bin.version());
                bin.block(&reconfig::removal_block_reason(occupied.item_count))?;
                events.push(WarehouseEvent::BinBlocked(BinBlocked {
                    tenant_id,
                    zone_id,
                    bin_id: occupied.bin_id,
                    address: occupied.address.clone(),
                    reason: reconfig::removal_block_reason(occupied.item_count),
                    occurred_at: Utc::now(),
                }));
                batch.updates.push((bin, planned_against));
            }
            blocked_bins.push(occupied.clone());
        }

        for planned in &plan.create {
            batch.creates.push(Bin::from_planned(
                BinId::new(EntityId::new()),
                tenant_id,
                zone_id,
                planned,
            ));
        }

        let bins_deleted = batch.deletes.len();
        let items_detached = self.bins.apply_batch(tenant_id, zone_id, batch)?;
        let outcome = ReconfigurationOutcome {
            bins_created: plan.create.len(),
            bins_preserved: plan.preserve.len(),
            bins_updated: plan.update.len(),
            bins_deleted,
            bins_blocked: blocked_bins.len(),
            items_detached,
            blocked_bins,
        };
        zone.set_structure(structure)?;
        self.zones.update(zone.clone())?;

        tracing::info!(
            zone_id = %zone_id,
            created = outcome.bins_created,
            preserved = outcome.bins_preserved,
            updated = outcome.bins_updated,
            deleted = outcome.bins_deleted,
            blocked = outcome.bins_blocked,
            items_detached = outcome.items_detached,
            first_configuration = plan.is_first_configuration,
            "zone structure configured"
        );

        self.publish(
            tenant_id,
            zone_id.0,
            "warehouse.zone",
            WarehouseEvent::ZoneStructureConfigured(ZoneStructureConfigured {
                tenant_id,
                zone_id,
                bins_created: outcome.bins_created,
                bins_preserved: outcome.bins_preserved,
                bins_updated: outcome.bins_updated,
                bins_deleted: outcome.bins_deleted,
                bins_blocked: outcome.bins_blocked,
                items_detached: outcome.items_detached,
                occurred_at: Utc::now(),
            }),
        );
        for event in events {
            self.publish(tenant_id, zone_id.0, "warehouse.bin", event);
        }

        Ok(ConfigureStructureResult::Applied { zone, outcome })
    }

    /// Store presentation metadata on the zone. No effect on bins.
    pub fn set_zone_layout(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
        layout: Option<ZoneLayout>,
    ) -> Result<Zone, ServiceError> {
        let guard = self.zone_guard(tenant_id, zone_id);
        let _held = lock(&guard);

        let (mut zone, _) = self.load_zone(tenant_id, zone_id)?;
        zone.set_layout(layout);
        self.zones.update(zone.clone())?;
        Ok(zone)
    }

    /// Delete a zone.
    ///
    /// A zone that still has bins is only deleted with `force_delete_bins`;
    /// items in those bins are detached first, never dropped.
    pub fn delete_zone(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
        force_delete_bins: bool,
    ) -> Result<ZoneDeletionOutcome, ServiceError> {
        let guard = self.zone_guard(tenant_id, zone_id);
        let _held = lock(&guard);

        let (zone, _) = self.load_zone(tenant_id, zone_id)?;
        let bin_count = self.zones.count_bins(tenant_id, zone_id)?;
        if bin_count > 0 && !force_delete_bins {
            return Err(DomainError::bad_request(format!(
                "zone {:?} still has {bin_count} bin(s); pass force_delete_bins to remove them",
                zone.code()
            ))
            .into());
        }

        let mut items_detached = 0;
        if bin_count > 0 {
            for bin in self.bins.find_many_by_zone(tenant_id, zone_id)? {
                items_detached += self.items.detach_from_bin(tenant_id, bin.id_typed())?;
            }
        }
        let bins_deleted = self.bins.delete_by_zone(tenant_id, zone_id)?;
        self.zones.delete(tenant_id, zone_id)?;
        self.drop_zone_guard(tenant_id, zone_id);

        tracing::info!(
            zone_id = %zone_id,
            bins_deleted,
            items_detached,
            "zone deleted"
        );
        self.publish(
            tenant_id,
            zone_id.0,
            "warehouse.zone",
            WarehouseEvent::ZoneDeleted(ZoneDeleted {
                tenant_id,
                zone_id,
                bins_deleted,
                occurred_at: Utc::now(),
            }),
        );

        Ok(ZoneDeletionOutcome {
            bins_deleted,
            items_detached,
        })
    }

    /// Load zone + owning warehouse, plan the target bin set, and diff it
    /// against the persisted bins.
    fn compute_plan(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
        structure: &ZoneStructure,
    ) -> Result<(Zone, Warehouse, Vec<Bin>, ReconfigurationPlan), ServiceError> {
        let (zone, warehouse) = self.load_zone(tenant_id, zone_id)?;
        let target = StructurePlanner::plan(structure, warehouse.code(), zone.code())?;
        let current = self.bins.find_many_by_zone(tenant_id, zone_id)?;
        let item_counts = self.bins.count_items_per_bin(tenant_id, zone_id)?;
        let plan = reconfig::diff(&target, &current, &item_counts);
        Ok((zone, warehouse, current, plan))
    }

    fn load_zone(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
    ) -> Result<(Zone, Warehouse), ServiceError> {
        let zone = self
            .zones
            .find_by_id(tenant_id, zone_id)?
            .ok_or_else(|| DomainError::not_found(format!("zone {zone_id}")))?;
        let warehouse = self
            .warehouses
            .find_by_id(tenant_id, zone.warehouse_id())?
            .ok_or_else(|| DomainError::not_found(format!("warehouse {}", zone.warehouse_id())))?;
        Ok((zone, warehouse))
    }

    fn zone_guard(&self, tenant_id: TenantId, zone_id: ZoneId) -> ZoneGuard {
        let mut guards = match self.zone_guards.lock() {
            Ok(g) => g,
            Err(p) => p.into_inner(),
        };
        guards.entry((tenant_id, zone_id)).or_default().clone()
    }

    /// Evict the guard of a deleted zone so the map does not grow without
    /// bound. A request still parked on the old guard wakes, re-loads the
    /// zone and gets `NotFound`.
    fn drop_zone_guard(&self, tenant_id: TenantId, zone_id: ZoneId) {
        let mut guards = match self.zone_guards.lock() {
            Ok(g) => g,
            Err(p) => p.into_inner(),
        };
        guards.remove(&(tenant_id, zone_id));
    }

    #[cfg(test)]
    pub(crate) fn zone_guard_count(&self) -> usize {
        match self.zone_guards.lock() {
            Ok(g) => g.len(),
            Err(p) => p.into_inner().len(),
        }
    }

    fn publish(
        &self,
        tenant_id: TenantId,
        source_id: EntityId,
        source_type: &str,
        event: WarehouseEvent,
    ) {
        let envelope = EventEnvelope::new(Uuid::now_v7(), tenant_id, source_id, source_type, event);
        if let Err(err) = self.bus.publish(envelope) {
            tracing::warn!(?err, "event publication failed, continuing");
        }
    }
}

fn lock(guard: &ZoneGuard) -> std::sync::MutexGuard<'_, ()> {
    match guard.lock() {
        Ok(held) => held,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn cloned(by_id: &HashMap<BinId, &Bin>, bin_id: BinId) -> Result<Bin, ServiceError> {
    by_id
        .get(&bin_id)
        .map(|bin| (*bin).clone())
        .ok_or_else(|| DomainError::not_found(format!("bin {bin_id}")).into())
}
