//! Warehouse: root of the physical storage hierarchy.

use serde::{Deserialize, Serialize};

use stockgrid_core::{DomainError, DomainResult, Entity, EntityId, TenantId};

use crate::address::is_valid_code;

/// Warehouse identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarehouseId(pub EntityId);

impl WarehouseId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Entity: warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warehouse {
    id: WarehouseId,
    tenant_id: TenantId,
    code: String,
    name: String,
    description: Option<String>,
    address: Option<String>,
    is_active: bool,
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Warehouse {
    /// Create a warehouse. The code (2-5 uppercase alphanumerics) becomes
    /// the first segment of every bin address in this warehouse.
    pub fn new(
        id: WarehouseId,
        tenant_id: TenantId,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> DomainResult<Self> {
        let code = code.into();
        if !is_valid_code(&code) {
            return Err(DomainError::bad_request(format!(
                "warehouse code {code:?} must be 2-5 uppercase alphanumeric characters"
            )));
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::bad_request("warehouse name cannot be empty"));
        }
        Ok(Self {
            id,
            tenant_id,
            code,
            name,
            description: None,
            address: None,
            is_active: true,
        })
    }

    pub fn id_typed(&self) -> WarehouseId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_address(&mut self, address: Option<String>) {
        self.address = address;
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
