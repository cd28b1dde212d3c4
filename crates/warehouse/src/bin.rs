//! Storage bin: the smallest addressable slot inside a zone.
//!
//! State space is `ACTIVE x {UNBLOCKED, BLOCKED}` plus `INACTIVE`. A blocked
//! or inactive bin never accepts new items; removals stay possible so stock
//! can be relocated out of a bin that was removed from the structure.

use serde::{Deserialize, Serialize};

use stockgrid_core::{DomainError, DomainResult, Entity, EntityId, TenantId};

use crate::capacity::CapacityGauge;
use crate::planner::PlannedBin;
use crate::zone::ZoneId;

/// Bin identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BinId(pub EntityId);

impl BinId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for BinId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Entity: storage bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    id: BinId,
    tenant_id: TenantId,
    zone_id: ZoneId,
    address: String,
    aisle: u8,
    shelf: u16,
    position: u8,
    gauge: CapacityGauge,
    is_active: bool,
    is_blocked: bool,
    block_reason: Option<String>,
    version: u64,
}

impl Entity for Bin {
    type Id = BinId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Bin {
    /// Fresh bin as created by a structure (re)configuration: uncapped,
    /// empty, active, unblocked.
    pub fn from_planned(id: BinId, tenant_id: TenantId, zone_id: ZoneId, planned: &PlannedBin) -> Self {
        Self {
            id,
            tenant_id,
            zone_id,
            address: planned.address.clone(),
            aisle: planned.aisle,
            shelf: planned.shelf,
            position: planned.position,
            gauge: CapacityGauge::uncapped(),
            is_active: true,
            is_blocked: false,
            block_reason: None,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> BinId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn zone_id(&self) -> ZoneId {
        self.zone_id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn aisle(&self) -> u8 {
        self.aisle
    }

    pub fn shelf(&self) -> u16 {
        self.shelf
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn capacity(&self) -> Option<u32> {
        self.gauge.capacity()
    }

    pub fn current_occupancy(&self) -> u32 {
        self.gauge.current()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_blocked(&self) -> bool {
        self.is_blocked
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.block_reason.as_deref()
    }

    /// Monotonic mutation counter, used for optimistic per-bin concurrency
    /// at the repository seam.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn available_capacity(&self) -> Option<u32> {
        self.gauge.available()
    }

    pub fn occupancy_percentage(&self) -> Option<f64> {
        self.gauge.percentage()
    }

    pub fn is_full(&self) -> bool {
        self.gauge.is_full()
    }

    pub fn is_near_capacity(&self) -> bool {
        self.gauge.is_near_capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.gauge.is_empty()
    }

    pub fn can_accept_items(&self) -> bool {
        self.is_active && !self.is_blocked && !self.is_full()
    }

    /// Add occupancy (item movement into the bin).
    pub fn add_occupancy(&mut self, n: u32) -> DomainResult<()> {
        if !self.is_active {
            return Err(DomainError::invalid_operation(format!(
                "bin {} is inactive",
                self.address
            )));
        }
        if self.is_blocked {
            return Err(DomainError::invalid_operation(format!(
                "bin {} is blocked",
                self.address
            )));
        }
        self.gauge.add(n)?;
        self.touch();
        Ok(())
    }

    /// Remove occupancy (item movement out of the bin). Allowed while
    /// blocked or inactive, so pending relocations can drain the bin.
    pub fn remove_occupancy(&mut self, n: u32) -> DomainResult<()> {
        self.gauge.remove(n)?;
        self.touch();
        Ok(())
    }

    /// Block the bin with a human-readable reason.
    pub fn block(&mut self, reason: &str) -> DomainResult<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::bad_request("block reason cannot be empty"));
        }
        if self.is_blocked {
            return Err(DomainError::invalid_operation(format!(
                "bin {} is already blocked",
                self.address
            )));
        }
        self.is_blocked = true;
        self.block_reason = Some(reason.to_string());
        self.touch();
        Ok(())
    }

    pub fn unblock(&mut self) {
        self.is_blocked = false;
        self.block_reason = None;
        self.touch();
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    /// Change the capacity bound. Never clamps below current occupancy.
    pub fn set_capacity(&mut self, capacity: Option<u32>) -> DomainResult<()> {
        self.gauge.set_capacity(capacity)?;
        self.touch();
        Ok(())
    }

    /// Patch the coordinate metadata during reconfiguration (same address,
    /// e.g. a labeling-direction flip moved this address to another slot).
    pub fn reposition(&mut self, aisle: u8, shelf: u16, position: u8) {
        self.aisle = aisle;
        self.shelf = shelf;
        self.position = position;
        self.touch();
    }

    fn touch(&mut self) {
        // Deterministic version tracking: +1 per mutation.
        self.version += 1;
    }
}
