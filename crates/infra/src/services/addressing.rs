//! Address lookup against a configured zone.
//!
//! Thin read-side service over [`AddressCodec`]: parsing uses the pattern
//! stored on the zone, existence checks and suggestions go through the bins
//! repository.

use std::sync::Arc;

use stockgrid_core::{DomainError, TenantId};
use stockgrid_warehouse::{AddressCodec, ParsedAddress, ZoneId};

use crate::repositories::{BinsRepository, ZonesRepository};
use crate::services::ServiceError;

pub struct AddressService {
    zones: Arc<dyn ZonesRepository>,
    bins: Arc<dyn BinsRepository>,
}

impl AddressService {
    pub fn new(zones: Arc<dyn ZonesRepository>, bins: Arc<dyn BinsRepository>) -> Self {
        Self { zones, bins }
    }

    /// Parse an address using the pattern configured on the zone.
    pub fn parse(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
        address: &str,
    ) -> Result<ParsedAddress, ServiceError> {
        let codec = self.codec_for(tenant_id, zone_id)?;
        Ok(codec.parse(address)?)
    }

    /// Whether `address` is well-formed for the zone's pattern AND refers to
    /// a persisted bin. Malformed input is a `false`, not an error.
    pub fn validate(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
        address: &str,
    ) -> Result<bool, ServiceError> {
        let codec = match self.codec_for(tenant_id, zone_id) {
            Ok(codec) => codec,
            Err(ServiceError::Domain(DomainError::InvalidOperation(_))) => return Ok(false),
            Err(err) => return Err(err),
        };
        if codec.parse(address).is_err() {
            return Ok(false);
        }
        Ok(self
            .bins
            .find_by_address(tenant_id, zone_id, address)?
            .is_some())
    }

    /// Up to `limit` addresses of bins that can accept items right now
    /// (active, unblocked, not full), in address order.
    pub fn suggest(
        &self,
        tenant_id: TenantId,
        zone_id: ZoneId,
        limit: usize,
    ) -> Result<Vec<String>, ServiceError> {
        let bins = self.bins.find_many_by_zone(tenant_id, zone_id)?;
        Ok(bins
            .iter()
            .filter(|bin| bin.can_accept_items())
            .take(limit)
            .map(|bin| bin.address().to_string())
            .collect())
    }

    fn codec_for(&self, tenant_id: TenantId, zone_id: ZoneId) -> Result<AddressCodec, ServiceError> {
        let zone = self
            .zones
            .find_by_id(tenant_id, zone_id)?
            .ok_or_else(|| DomainError::not_found(format!("zone {zone_id}")))?;
        let structure = zone.structure().ok_or_else(|| {
            DomainError::invalid_operation(format!(
                "zone {:?} has no structure configured",
                zone.code()
            ))
        })?;
        Ok(AddressCodec::new(structure.code_pattern))
    }
}
