//! Minimal stock-item surface needed for relocation/detachment.
//!
//! Full item management (lots, reservations, valuation) lives elsewhere;
//! reconfiguration only needs to know which bin an item points at and how to
//! clear that pointer without dropping the item.

use serde::{Deserialize, Serialize};

use stockgrid_core::{Entity, EntityId, TenantId};

use crate::bin::BinId;

/// Stock item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub EntityId);

impl ItemId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Entity: stock item, possibly stored in a bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockItem {
    id: ItemId,
    tenant_id: TenantId,
    sku: String,
    bin_id: Option<BinId>,
}

impl Entity for StockItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl StockItem {
    pub fn new(id: ItemId, tenant_id: TenantId, sku: impl Into<String>, bin_id: Option<BinId>) -> Self {
        Self {
            id,
            tenant_id,
            sku: sku.into(),
            bin_id,
        }
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn bin_id(&self) -> Option<BinId> {
        self.bin_id
    }

    /// Clear the bin reference (forced removal of the bin). The item itself
    /// survives and awaits relocation.
    pub fn detach(&mut self) {
        self.bin_id = None;
    }

    pub fn relocate(&mut self, bin_id: BinId) {
        self.bin_id = Some(bin_id);
    }
}
