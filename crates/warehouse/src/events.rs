//! Domain events emitted by warehouse operations.
//!
//! Consumed by audit/notification subscribers over the event bus. Emission
//! is best-effort: operations never fail because a subscriber (or the bus)
//! is unavailable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockgrid_core::TenantId;
use stockgrid_events::Event;

use crate::bin::BinId;
use crate::warehouse::WarehouseId;
use crate::zone::ZoneId;

/// Event: WarehouseCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseCreated {
    pub tenant_id: TenantId,
    pub warehouse_id: WarehouseId,
    pub code: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ZoneCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCreated {
    pub tenant_id: TenantId,
    pub warehouse_id: WarehouseId,
    pub zone_id: ZoneId,
    pub code: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ZoneStructureConfigured (an executed reconfiguration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneStructureConfigured {
    pub tenant_id: TenantId,
    pub zone_id: ZoneId,
    pub bins_created: usize,
    pub bins_preserved: usize,
    pub bins_updated: usize,
    pub bins_deleted: usize,
    pub bins_blocked: usize,
    pub items_detached: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ZoneDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDeleted {
    pub tenant_id: TenantId,
    pub zone_id: ZoneId,
    pub bins_deleted: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BinBlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinBlocked {
    pub tenant_id: TenantId,
    pub zone_id: ZoneId,
    pub bin_id: BinId,
    pub address: String,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemsDetached (forced removal of an occupied bin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsDetached {
    pub tenant_id: TenantId,
    pub zone_id: ZoneId,
    pub bin_id: BinId,
    pub item_count: usize,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarehouseEvent {
    WarehouseCreated(WarehouseCreated),
    ZoneCreated(ZoneCreated),
    ZoneStructureConfigured(ZoneStructureConfigured),
    ZoneDeleted(ZoneDeleted),
    BinBlocked(BinBlocked),
    ItemsDetached(ItemsDetached),
}

impl Event for WarehouseEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WarehouseEvent::WarehouseCreated(_) => "warehouse.created",
            WarehouseEvent::ZoneCreated(_) => "warehouse.zone.created",
            WarehouseEvent::ZoneStructureConfigured(_) => "warehouse.zone.reconfigured",
            WarehouseEvent::ZoneDeleted(_) => "warehouse.zone.deleted",
            WarehouseEvent::BinBlocked(_) => "warehouse.bin.blocked",
            WarehouseEvent::ItemsDetached(_) => "warehouse.bin.items_detached",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            WarehouseEvent::WarehouseCreated(e) => e.occurred_at,
            WarehouseEvent::ZoneCreated(e) => e.occurred_at,
            WarehouseEvent::ZoneStructureConfigured(e) => e.occurred_at,
            WarehouseEvent::ZoneDeleted(e) => e.occurred_at,
            WarehouseEvent::BinBlocked(e) => e.occurred_at,
            WarehouseEvent::ItemsDetached(e) => e.occurred_at,
        }
    }
}
