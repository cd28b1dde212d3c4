use stockgrid_core::TenantId;

use crate::EventEnvelope;

/// Helper trait for tenant-scoped messages.
///
/// Marks types carrying an associated tenant id, so infrastructure
/// components (subscription loops, workers) can filter or validate messages
/// per tenant without knowing the payload type.
pub trait TenantScoped {
    fn tenant_id(&self) -> TenantId;
}

impl<E> TenantScoped for EventEnvelope<E> {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id()
    }
}
