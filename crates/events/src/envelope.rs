use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockgrid_core::{EntityId, TenantId};

/// Envelope for an event, containing multi-tenant + source metadata.
///
/// This is the unit handed to the bus (and from there to audit/notification
/// consumers).
///
/// Notes:
/// - **Multi-tenancy** is enforced here via `tenant_id`.
/// - `source_id`/`source_type` identify the entity the event is about
///   (a zone for reconfigurations, a bin for blocking).
/// - `payload` is the domain event itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    tenant_id: TenantId,

    source_id: EntityId,
    source_type: String,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        tenant_id: TenantId,
        source_id: EntityId,
        source_type: impl Into<String>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            tenant_id,
            source_id,
            source_type: source_type.into(),
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn source_id(&self) -> EntityId {
        self.source_id
    }

    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
