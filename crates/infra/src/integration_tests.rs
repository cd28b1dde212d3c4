//! Integration tests for the full reconfiguration pipeline.
//!
//! Tests: Service → Planner/Differ → Repositories → EventBus
//!
//! Verifies:
//! - First configuration and reconfiguration land the right bin sets
//! - Occupied bins are blocked or force-detached, never silently dropped
//! - Dry runs leave storage untouched
//! - Concurrent reconfigurations of one zone serialize to a consistent state

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use stockgrid_core::{EntityId, TenantId};
    use stockgrid_events::{Event, EventBus, EventEnvelope, InMemoryEventBus};
    use stockgrid_warehouse::{
        Bin, BinDirection, BinId, BinLabeling, CodePattern, ItemId, ReconfigurationFlags,
        StockItem, WarehouseEvent, Zone, ZoneId, ZoneStructure,
    };

    use crate::repositories::{
        BinsRepository, InMemoryWarehouseStore, ItemsRepository, WarehousesRepository,
        ZonesRepository,
    };
    use crate::services::{
        AddressService, ConfigureStructureResult, ProvisioningService, ServiceError,
        ZoneStructureService,
    };
    use stockgrid_core::DomainError;

    type Bus = Arc<InMemoryEventBus<EventEnvelope<WarehouseEvent>>>;

    struct Harness {
        tenant_id: TenantId,
        zone_id: ZoneId,
        bus: Bus,
        zones: Arc<dyn ZonesRepository>,
        bins: Arc<dyn BinsRepository>,
        items: Arc<dyn ItemsRepository>,
        service: Arc<ZoneStructureService<Bus>>,
        addresses: AddressService,
    }

    fn setup() -> Harness {
        stockgrid_observability::tracing::init_for_tests();
        let store = Arc::new(InMemoryWarehouseStore::new());
        let bus: Bus = Arc::new(InMemoryEventBus::new());

        let warehouses: Arc<dyn WarehousesRepository> = store.clone();
        let zones: Arc<dyn ZonesRepository> = store.clone();
        let bins: Arc<dyn BinsRepository> = store.clone();
        let items: Arc<dyn ItemsRepository> = store.clone();

        let tenant_id = TenantId::new();
        let provisioning =
            ProvisioningService::new(warehouses.clone(), zones.clone(), bus.clone());
        let warehouse = provisioning
            .create_warehouse(tenant_id, "WH", "Main")
            .unwrap();
        let zone = provisioning
            .create_zone(tenant_id, warehouse.id_typed(), "ZN", "Ambient")
            .unwrap();

        let service = Arc::new(ZoneStructureService::new(
            warehouses,
            zones.clone(),
            bins.clone(),
            items.clone(),
            bus.clone(),
        ));
        let addresses = AddressService::new(zones.clone(), bins.clone());

        Harness {
            tenant_id,
            zone_id: zone.id_typed(),
            bus,
            zones,
            bins,
            items,
            service,
            addresses,
        }
    }

    fn apply(harness: &Harness, structure: ZoneStructure) -> ConfigureStructureResult {
        harness
            .service
            .configure_structure(
                harness.tenant_id,
                harness.zone_id,
                structure,
                ReconfigurationFlags {
                    regenerate_bins: true,
                    force_remove_occupied: false,
                },
            )
            .unwrap()
    }

    fn bin_at(harness: &Harness, address: &str) -> Option<Bin> {
        harness
            .bins
            .find_by_address(harness.tenant_id, harness.zone_id, address)
            .unwrap()
    }

    fn put_items(harness: &Harness, bin_id: BinId, count: usize) {
        for i in 0..count {
            harness
                .items
                .create(StockItem::new(
                    ItemId::new(EntityId::new()),
                    harness.tenant_id,
                    format!("SKU-{i}"),
                    Some(bin_id),
                ))
                .unwrap();
        }
    }

    fn stored_zone(harness: &Harness) -> Zone {
        harness
            .zones
            .find_by_id(harness.tenant_id, harness.zone_id)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn first_configuration_creates_every_bin() {
        let harness = setup();

        let result = apply(&harness, ZoneStructure::uniform(2, 3, 4));
        let ConfigureStructureResult::Applied { zone, outcome } = result else {
            panic!("expected an applied reconfiguration");
        };

        assert_eq!(outcome.bins_created, 24);
        assert_eq!(outcome.bins_preserved, 0);
        assert_eq!(outcome.bins_deleted, 0);
        assert!(zone.is_configured());

        let bins = harness
            .bins
            .find_many_by_zone(harness.tenant_id, harness.zone_id)
            .unwrap();
        assert_eq!(bins.len(), 24);
        assert!(bin_at(&harness, "WH-ZN-1-01-A").is_some());
        assert!(bin_at(&harness, "WH-ZN-2-03-D").is_some());
    }

    #[test]
    fn dry_run_reports_counts_without_touching_storage() {
        let harness = setup();

        let result = harness
            .service
            .configure_structure(
                harness.tenant_id,
                harness.zone_id,
                ZoneStructure::uniform(2, 3, 4),
                ReconfigurationFlags::default(),
            )
            .unwrap();
        let ConfigureStructureResult::Preview(preview) = result else {
            panic!("expected a preview");
        };

        assert!(preview.is_first_configuration);
        assert_eq!(preview.bins_to_create, 24);
        assert_eq!(preview.total_new_bins, 24);

        assert!(!stored_zone(&harness).is_configured());
        assert!(
            harness
                .bins
                .find_many_by_zone(harness.tenant_id, harness.zone_id)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn preview_structure_samples_are_a_deterministic_prefix() {
        let harness = setup();
        let structure = ZoneStructure::uniform(3, 5, 10);

        let preview = harness
            .service
            .preview_structure(harness.tenant_id, harness.zone_id, &structure)
            .unwrap();

        assert_eq!(preview.total_bins, 150);
        assert_eq!(preview.sample_bins.len(), 10);
        assert_eq!(preview.sample_bins[0], "WH-ZN-1-01-A");
        let again = harness
            .service
            .preview_structure(harness.tenant_id, harness.zone_id, &structure)
            .unwrap();
        assert_eq!(preview, again);
    }

    #[test]
    fn shrink_preserves_deletes_and_blocks() {
        let harness = setup();
        apply(&harness, ZoneStructure::uniform(1, 1, 3));

        let a_id = bin_at(&harness, "WH-ZN-1-01-A").unwrap().id_typed();
        let c_id = bin_at(&harness, "WH-ZN-1-01-C").unwrap().id_typed();
        put_items(&harness, c_id, 5);

        let ConfigureStructureResult::Applied { outcome, .. } =
            apply(&harness, ZoneStructure::uniform(1, 1, 1))
        else {
            panic!("expected an applied reconfiguration");
        };

        assert_eq!(outcome.bins_preserved, 1);
        assert_eq!(outcome.bins_deleted, 1);
        assert_eq!(outcome.bins_blocked, 1);
        assert_eq!(outcome.items_detached, 0);
        assert_eq!(outcome.blocked_bins[0].item_count, 5);

        // A survived under the same id, B is gone, C is blocked in place.
        assert_eq!(bin_at(&harness, "WH-ZN-1-01-A").unwrap().id_typed(), a_id);
        assert!(bin_at(&harness, "WH-ZN-1-01-B").is_none());
        let c = bin_at(&harness, "WH-ZN-1-01-C").unwrap();
        assert!(c.is_blocked());
        assert!(c.block_reason().unwrap().contains("pending relocation"));
        assert!(!c.can_accept_items());
    }

    #[test]
    fn blocked_bin_survives_a_second_reconfiguration() {
        let harness = setup();
        apply(&harness, ZoneStructure::uniform(1, 1, 3));
        let c_id = bin_at(&harness, "WH-ZN-1-01-C").unwrap().id_typed();
        put_items(&harness, c_id, 2);

        apply(&harness, ZoneStructure::uniform(1, 1, 1));
        let ConfigureStructureResult::Applied { outcome, .. } =
            apply(&harness, ZoneStructure::uniform(1, 1, 1))
        else {
            panic!("expected an applied reconfiguration");
        };

        // Still occupied, still out of the structure: reported again, not
        // double-blocked and not deleted.
        assert_eq!(outcome.bins_blocked, 1);
        assert!(bin_at(&harness, "WH-ZN-1-01-C").unwrap().is_blocked());
    }

    #[test]
    fn force_remove_detaches_items_and_deletes_the_bin() {
        let harness = setup();
        apply(&harness, ZoneStructure::uniform(1, 1, 3));
        let c_id = bin_at(&harness, "WH-ZN-1-01-C").unwrap().id_typed();
        put_items(&harness, c_id, 5);

        let result = harness
            .service
            .configure_structure(
                harness.tenant_id,
                harness.zone_id,
                ZoneStructure::uniform(1, 1, 1),
                ReconfigurationFlags {
                    regenerate_bins: true,
                    force_remove_occupied: true,
                },
            )
            .unwrap();
        let ConfigureStructureResult::Applied { outcome, .. } = result else {
            panic!("expected an applied reconfiguration");
        };

        assert_eq!(outcome.items_detached, 5);
        assert_eq!(outcome.bins_blocked, 0);
        assert_eq!(outcome.bins_deleted, 2);
        assert!(bin_at(&harness, "WH-ZN-1-01-C").is_none());
        assert!(
            harness
                .items
                .find_by_bin(harness.tenant_id, c_id)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn direction_flip_updates_slots_in_place() {
        let harness = setup();
        let up = CodePattern::new('-', 1, 2, BinLabeling::Letters, BinDirection::BottomUp).unwrap();
        let down = CodePattern::new('-', 1, 2, BinLabeling::Letters, BinDirection::TopDown).unwrap();
        apply(&harness, ZoneStructure::uniform(1, 1, 3).with_pattern(up));

        let a_before = bin_at(&harness, "WH-ZN-1-01-A").unwrap();
        assert_eq!(a_before.position(), 1);

        let ConfigureStructureResult::Applied { outcome, .. } =
            apply(&harness, ZoneStructure::uniform(1, 1, 3).with_pattern(down))
        else {
            panic!("expected an applied reconfiguration");
        };

        assert_eq!(outcome.bins_updated, 2);
        assert_eq!(outcome.bins_preserved, 1);
        assert_eq!(outcome.bins_created, 0);
        assert_eq!(outcome.bins_deleted, 0);

        // Same bin row, new physical slot.
        let a_after = bin_at(&harness, "WH-ZN-1-01-A").unwrap();
        assert_eq!(a_after.id_typed(), a_before.id_typed());
        assert_eq!(a_after.position(), 3);
    }

    #[test]
    fn reconfiguration_publishes_events_after_commit() {
        let harness = setup();
        let subscription = harness.bus.subscribe();

        apply(&harness, ZoneStructure::uniform(1, 1, 2));

        let envelope = subscription.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(envelope.tenant_id(), harness.tenant_id);
        assert_eq!(envelope.source_type(), "warehouse.zone");
        assert_eq!(envelope.payload().event_type(), "warehouse.zone.reconfigured");
    }

    #[test]
    fn delete_zone_refuses_without_force_then_cascades_with_it() {
        let harness = setup();
        apply(&harness, ZoneStructure::uniform(1, 1, 2));
        let a_id = bin_at(&harness, "WH-ZN-1-01-A").unwrap().id_typed();
        put_items(&harness, a_id, 3);

        let err = harness
            .service
            .delete_zone(harness.tenant_id, harness.zone_id, false)
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::BadRequest(_))
        ));

        let outcome = harness
            .service
            .delete_zone(harness.tenant_id, harness.zone_id, true)
            .unwrap();
        assert_eq!(outcome.bins_deleted, 2);
        assert_eq!(outcome.items_detached, 3);
        assert!(
            harness
                .zones
                .find_by_id(harness.tenant_id, harness.zone_id)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn zone_guard_is_dropped_with_the_zone() {
        let harness = setup();
        apply(&harness, ZoneStructure::uniform(1, 1, 2));
        assert_eq!(harness.service.zone_guard_count(), 1);

        harness
            .service
            .delete_zone(harness.tenant_id, harness.zone_id, true)
            .unwrap();
        assert_eq!(harness.service.zone_guard_count(), 0);
    }

    #[test]
    fn address_validation_and_suggestions() {
        let harness = setup();
        apply(&harness, ZoneStructure::uniform(1, 1, 3));

        assert!(
            harness
                .addresses
                .validate(harness.tenant_id, harness.zone_id, "WH-ZN-1-01-B")
                .unwrap()
        );
        // Well-formed but not a persisted bin.
        assert!(
            !harness
                .addresses
                .validate(harness.tenant_id, harness.zone_id, "WH-ZN-1-01-Z")
                .unwrap()
        );
        // Malformed is a false, not an error.
        assert!(
            !harness
                .addresses
                .validate(harness.tenant_id, harness.zone_id, "garbage")
                .unwrap()
        );

        let mut b = bin_at(&harness, "WH-ZN-1-01-B").unwrap();
        let loaded_at = b.version();
        b.block("cycle count").unwrap();
        harness
            .bins
            .update(b, stockgrid_core::ExpectedVersion::Exact(loaded_at))
            .unwrap();

        let suggestions = harness
            .addresses
            .suggest(harness.tenant_id, harness.zone_id, 10)
            .unwrap();
        assert_eq!(suggestions, vec!["WH-ZN-1-01-A", "WH-ZN-1-01-C"]);
    }

    #[test]
    fn concurrent_reconfigurations_of_one_zone_stay_consistent() {
        let harness = setup();
        apply(&harness, ZoneStructure::uniform(1, 1, 2));

        let mut handles = Vec::new();
        for bins_per_shelf in [3u8, 5] {
            let service = harness.service.clone();
            let tenant_id = harness.tenant_id;
            let zone_id = harness.zone_id;
            handles.push(std::thread::spawn(move || {
                service.configure_structure(
                    tenant_id,
                    zone_id,
                    ZoneStructure::uniform(1, 1, bins_per_shelf),
                    ReconfigurationFlags {
                        regenerate_bins: true,
                        force_remove_occupied: false,
                    },
                )
            }));
        }
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        // One of the two writers won; whichever it was, the persisted bins
        // must exactly match the structure stored on the zone.
        let zone = stored_zone(&harness);
        let structure = zone.structure().unwrap();
        let bins = harness
            .bins
            .find_many_by_zone(harness.tenant_id, harness.zone_id)
            .unwrap();
        assert_eq!(bins.len() as u32, structure.total_bins());
        assert!([3usize, 5].contains(&bins.len()));
    }
}
