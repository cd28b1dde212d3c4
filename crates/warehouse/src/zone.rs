//! Zone: a subdivision of a warehouse with its own bin structure.

use serde::{Deserialize, Serialize};

use stockgrid_core::{DomainError, DomainResult, Entity, EntityId, TenantId};

use crate::address::is_valid_code;
use crate::structure::{ZoneLayout, ZoneStructure};
use crate::warehouse::WarehouseId;

/// Zone identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub EntityId);

impl ZoneId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Entity: zone.
///
/// `structure` is `None` until the first configuration; the reconfiguration
/// flow reports that case as `is_first_configuration`.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    id: ZoneId,
    tenant_id: TenantId,
    warehouse_id: WarehouseId,
    code: String,
    name: String,
    structure: Option<ZoneStructure>,
    layout: Option<ZoneLayout>,
    is_active: bool,
}

impl Entity for Zone {
    type Id = ZoneId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Zone {
    pub fn new(
        id: ZoneId,
        tenant_id: TenantId,
        warehouse_id: WarehouseId,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> DomainResult<Self> {
        let code = code.into();
        if !is_valid_code(&code) {
            return Err(DomainError::bad_request(format!(
                "zone code {code:?} must be 2-5 uppercase alphanumeric characters"
            )));
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::bad_request("zone name cannot be empty"));
        }
        Ok(Self {
            id,
            tenant_id,
            warehouse_id,
            code,
            name,
            structure: None,
            layout: None,
            is_active: true,
        })
    }

    pub fn id_typed(&self) -> ZoneId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn structure(&self) -> Option<&ZoneStructure> {
        self.structure.as_ref()
    }

    pub fn layout(&self) -> Option<&ZoneLayout> {
        self.layout.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_configured(&self) -> bool {
        self.structure.is_some()
    }

    /// Store a validated structure (the reconfiguration service validates
    /// and derives bins before calling this).
    pub fn set_structure(&mut self, structure: ZoneStructure) -> DomainResult<()> {
        structure.validate()?;
        self.structure = Some(structure);
        Ok(())
    }

    pub fn set_layout(&mut self, layout: Option<ZoneLayout>) {
        self.layout = layout;
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
