//! Generic location model used by simpler call sites.
//!
//! A parallel representation of the same physical hierarchy as
//! Warehouse/Zone/Bin, for callers that only need a tree of coded slots
//! with capacities. The occupancy invariant is the shared [`CapacityGauge`];
//! neither model is treated as legacy.

use serde::{Deserialize, Serialize};

use stockgrid_core::{DomainError, DomainResult, Entity, EntityId, TenantId};

use crate::address::is_valid_code;
use crate::capacity::CapacityGauge;

/// Level of a generic location within the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Warehouse,
    Zone,
    Aisle,
    Shelf,
    Bin,
}

impl LocationType {
    /// Every level may hold children except the leaf.
    pub fn can_have_children(self) -> bool {
        !matches!(self, LocationType::Bin)
    }
}

/// Location identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub EntityId);

impl LocationId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LocationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Entity: generic location.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    id: LocationId,
    tenant_id: TenantId,
    code: String,
    description: Option<String>,
    location_type: LocationType,
    parent_id: Option<LocationId>,
    gauge: CapacityGauge,
    is_active: bool,
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Location {
    /// Root location (no parent).
    pub fn new_root(
        id: LocationId,
        tenant_id: TenantId,
        code: impl Into<String>,
        location_type: LocationType,
    ) -> DomainResult<Self> {
        Self::build(id, tenant_id, code, location_type, None)
    }

    /// Child location. The parent must be a level that allows children.
    pub fn new_child(
        id: LocationId,
        tenant_id: TenantId,
        code: impl Into<String>,
        location_type: LocationType,
        parent: &Location,
    ) -> DomainResult<Self> {
        if !parent.location_type().can_have_children() {
            return Err(DomainError::invalid_operation(format!(
                "location {} is a bin and cannot have children",
                parent.code()
            )));
        }
        Self::build(id, tenant_id, code, location_type, Some(parent.id_typed()))
    }

    fn build(
        id: LocationId,
        tenant_id: TenantId,
        code: impl Into<String>,
        location_type: LocationType,
        parent_id: Option<LocationId>,
    ) -> DomainResult<Self> {
        let code = code.into();
        if !is_valid_code(&code) {
            return Err(DomainError::bad_request(format!(
                "location code {code:?} must be 2-5 uppercase alphanumeric characters"
            )));
        }
        Ok(Self {
            id,
            tenant_id,
            code,
            description: None,
            location_type,
            parent_id,
            gauge: CapacityGauge::uncapped(),
            is_active: true,
        })
    }

    pub fn id_typed(&self) -> LocationId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn location_type(&self) -> LocationType {
        self.location_type
    }

    pub fn parent_id(&self) -> Option<LocationId> {
        self.parent_id
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

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn can_accept_items(&self) -> bool {
        self.is_active && !self.gauge.is_full()
    }

    pub fn add_occupancy(&mut self, n: u32) -> DomainResult<()> {
        if !self.is_active {
            return Err(DomainError::invalid_operation(format!(
                "location {} is inactive",
                self.code
            )));
        }
        self.gauge.add(n)
    }

    pub fn remove_occupancy(&mut self, n: u32) -> DomainResult<()> {
        self.gauge.remove(n)
    }

    pub fn set_capacity(&mut self, capacity: Option<u32>) -> DomainResult<()> {
        self.gauge.set_capacity(capacity)
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
