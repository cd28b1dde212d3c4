//! Warehouse and zone provisioning.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use stockgrid_core::{DomainError, EntityId, TenantId};
use stockgrid_events::{EventBus, EventEnvelope};
use stockgrid_warehouse::events::{WarehouseCreated, ZoneCreated};
use stockgrid_warehouse::{Warehouse, WarehouseEvent, WarehouseId, Zone, ZoneId};

use crate::repositories::{WarehousesRepository, ZonesRepository};
use crate::services::ServiceError;

/// Creates warehouses and zones. Structure configuration is a separate step
/// (`ZoneStructureService`); a fresh zone starts unconfigured.
pub struct ProvisioningService<B> {
    warehouses: Arc<dyn WarehousesRepository>,
    zones: Arc<dyn ZonesRepository>,
    bus: B,
}

impl<B> ProvisioningService<B>
where
    B: EventBus<EventEnvelope<WarehouseEvent>>,
{
    pub fn new(
        warehouses: Arc<dyn WarehousesRepository>,
        zones: Arc<dyn ZonesRepository>,
        bus: B,
    ) -> Self {
        Self {
            warehouses,
            zones,
            bus,
        }
    }

    pub fn create_warehouse(
        &self,
        tenant_id: TenantId,
        code: &str,
        name: &str,
    ) -> Result<Warehouse, ServiceError> {
        let warehouse = Warehouse::new(WarehouseId::new(EntityId::new()), tenant_id, code, name)?;
        self.warehouses.create(warehouse.clone())?;

        tracing::info!(warehouse_id = %warehouse.id_typed(), code, "warehouse created");
        self.publish(
            tenant_id,
            warehouse.id_typed().0,
            "warehouse",
            WarehouseEvent::WarehouseCreated(WarehouseCreated {
                tenant_id,
                warehouse_id: warehouse.id_typed(),
                code: code.to_string(),
                occurred_at: Utc::now(),
            }),
        );
        Ok(warehouse)
    }

    pub fn create_zone(
        &self,
        tenant_id: TenantId,
        warehouse_id: WarehouseId,
        code: &str,
        name: &str,
    ) -> Result<Zone, ServiceError> {
        self.warehouses
            .find_by_id(tenant_id, warehouse_id)?
            .ok_or_else(|| DomainError::not_found(format!("warehouse {warehouse_id}")))?;

        let zone = Zone::new(ZoneId::new(EntityId::new()), tenant_id, warehouse_id, code, name)?;
        self.zones.create(zone.clone())?;

        tracing::info!(zone_id = %zone.id_typed(), code, "zone created");
        self.publish(
            tenant_id,
            zone.id_typed().0,
            "warehouse.zone",
            WarehouseEvent::ZoneCreated(ZoneCreated {
                tenant_id,
                warehouse_id,
                zone_id: zone.id_typed(),
                code: code.to_string(),
                occurred_at: Utc::now(),
            }),
        );
        Ok(zone)
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
