//! Reconfiguration differ: target bin set vs. persisted bin set.
//!
//! Pure classification; loading bins and applying the resulting plan is the
//! zone-structure service's job. Every address in `current UNION target` lands
//! in exactly one bucket:
//!
//! - **preserve** — address in both, coordinate metadata unchanged
//! - **update** — address in both, coordinates differ (labeling-direction
//!   flips move an address to another physical slot)
//! - **create** — address in target only
//! - **delete_empty** — address in current only, bin holds no items
//! - **occupied** — address in current only, bin holds items; execution
//!   either blocks the bin or force-detaches the items, never drops them

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::bin::{Bin, BinId};
use crate::planner::PlannedBin;

/// Flags controlling how a reconfiguration request is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconfigurationFlags {
    /// `false` = dry-run preview, storage untouched.
    pub regenerate_bins: bool,
    /// `true` = occupied removal candidates are deleted and their items
    /// detached; `false` = those bins are blocked instead.
    pub force_remove_occupied: bool,
}

/// Reference to an existing bin, kept in plan buckets for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinRef {
    pub bin_id: BinId,
    pub address: String,
}

/// Coordinate patch for a bin whose address survived but moved slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinUpdate {
    pub bin_id: BinId,
    pub address: String,
    pub aisle: u8,
    pub shelf: u16,
    pub position: u8,
}

/// A removal candidate that still holds items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupiedBin {
    pub bin_id: BinId,
    pub address: String,
    pub item_count: usize,
}

/// Classified diff between a target structure and the persisted bins.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconfigurationPlan {
    pub preserve: Vec<BinRef>,
    pub update: Vec<BinUpdate>,
    pub create: Vec<PlannedBin>,
    pub delete_empty: Vec<BinRef>,
    pub occupied: Vec<OccupiedBin>,
    pub is_first_configuration: bool,
}

impl ReconfigurationPlan {
    /// Total number of bins the new structure implies.
    pub fn total_new_bins(&self) -> usize {
        self.preserve.len() + self.update.len() + self.create.len()
    }

    /// Dry-run summary (the `regenerate_bins == false` response).
    pub fn preview(&self) -> ReconfigurationPreview {
        ReconfigurationPreview {
            bins_to_preserve: self.preserve.len(),
            bins_to_create: self.create.len(),
            bins_to_delete_empty: self.delete_empty.len(),
            bins_with_items: self.occupied.clone(),
            total_affected_items: self.occupied.iter().map(|b| b.item_count).sum(),
            address_updates: self.update.len(),
            is_first_configuration: self.is_first_configuration,
            total_new_bins: self.total_new_bins(),
        }
    }
}

/// Counts returned by a dry-run preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconfigurationPreview {
    pub bins_to_preserve: usize,
    pub bins_to_create: usize,
    pub bins_to_delete_empty: usize,
    pub bins_with_items: Vec<OccupiedBin>,
    pub total_affected_items: usize,
    pub address_updates: usize,
    pub is_first_configuration: bool,
    pub total_new_bins: usize,
}

/// Counts returned by an executed reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconfigurationOutcome {
    pub bins_created: usize,
    pub bins_preserved: usize,
    pub bins_updated: usize,
    pub bins_deleted: usize,
    pub bins_blocked: usize,
    pub items_detached: usize,
    pub blocked_bins: Vec<OccupiedBin>,
}

/// Block reason recorded on occupied bins that fell out of the structure.
pub fn removal_block_reason(item_count: usize) -> String {
    format!("removed from structure, {item_count} item(s) pending relocation")
}

/// Classify `current` bins against the `target` bin set.
///
/// Keyed by address string; coordinate metadata decides preserve vs update.
/// Output ordering follows the input slices, so a sorted target gives a
/// deterministic plan.
pub fn diff(
    target: &[PlannedBin],
    current: &[Bin],
    item_counts: &HashMap<BinId, usize>,
) -> ReconfigurationPlan {
    let current_by_address: HashMap<&str, &Bin> =
        current.iter().map(|bin| (bin.address(), bin)).collect();
    let target_addresses: HashSet<&str> =
        target.iter().map(|planned| planned.address.as_str()).collect();

    let mut preserve = Vec::new();
    let mut update = Vec::new();
    let mut create = Vec::new();

    for planned in target {
        match current_by_address.get(planned.address.as_str()) {
            Some(bin) => {
                let same_coords = bin.aisle() == planned.aisle
                    && bin.shelf() == planned.shelf
                    && bin.position() == planned.position;
                if same_coords {
                    preserve.push(BinRef {
                        bin_id: bin.id_typed(),
                        address: planned.address.clone(),
                    });
                } else {
                    update.push(BinUpdate {
                        bin_id: bin.id_typed(),
                        address: planned.address.clone(),
                        aisle: planned.aisle,
                        shelf: planned.shelf,
                        position: planned.position,
                    });
                }
            }
            None => create.push(planned.clone()),
        }
    }

    let mut delete_empty = Vec::new();
    let mut occupied = Vec::new();
    for bin in current {
        if target_addresses.contains(bin.address()) {
            continue;
        }
        let item_count = item_counts.get(&bin.id_typed()).copied().unwrap_or(0);
        if item_count == 0 {
            delete_empty.push(BinRef {
                bin_id: bin.id_typed(),
                address: bin.address().to_string(),
            });
        } else {
            occupied.push(OccupiedBin {
                bin_id: bin.id_typed(),
                address: bin.address().to_string(),
                item_count,
            });
        }
    }

    ReconfigurationPlan {
        preserve,
        update,
        create,
        delete_empty,
        occupied,
        is_first_configuration: current.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::code_pattern::{BinDirection, BinLabeling, CodePattern};
    use crate::planner::StructurePlanner;
    use crate::structure::ZoneStructure;
    use crate::zone::ZoneId;
    use stockgrid_core::{EntityId, TenantId};

    fn pattern(direction: BinDirection) -> CodePattern {
        CodePattern::new('-', 2, 2, BinLabeling::Letters, direction).unwrap()
    }

    fn bins_for(structure: &ZoneStructure) -> Vec<Bin> {
        let tenant = TenantId::new();
        let zone = ZoneId::new(EntityId::new());
        StructurePlanner::plan(structure, "WH", "ZN")
            .unwrap()
            .iter()
            .map(|planned| {
                Bin::from_planned(
                    crate::bin::BinId::new(EntityId::new()),
                    tenant,
                    zone,
                    planned,
                )
            })
            .collect()
    }

    #[test]
    fn first_configuration_creates_everything() {
        let structure = ZoneStructure::uniform(1, 1, 3).with_pattern(pattern(BinDirection::BottomUp));
        let target = StructurePlanner::plan(&structure, "WH", "ZN").unwrap();
        let plan = diff(&target, &[], &HashMap::new());

        assert!(plan.is_first_configuration);
        assert_eq!(plan.create.len(), 3);
        assert!(plan.preserve.is_empty());
        assert!(plan.update.is_empty());
        assert!(plan.delete_empty.is_empty());
        assert!(plan.occupied.is_empty());
    }

    #[test]
    fn identical_structure_preserves_everything() {
        let structure = ZoneStructure::uniform(2, 2, 2).with_pattern(pattern(BinDirection::BottomUp));
        let current = bins_for(&structure);
        let target = StructurePlanner::plan(&structure, "WH", "ZN").unwrap();
        let plan = diff(&target, &current, &HashMap::new());

        assert_eq!(plan.preserve.len(), 8);
        assert_eq!(plan.total_new_bins(), 8);
        assert!(plan.create.is_empty());
        assert!(plan.update.is_empty());
        assert!(!plan.is_first_configuration);
    }

    #[test]
    fn shrink_classifies_empty_and_occupied_removals() {
        // Spec'd scenario: bins A, B, C exist; C holds 5 items; shrink to
        // one bin per shelf.
        let old = ZoneStructure::uniform(1, 1, 3).with_pattern(pattern(BinDirection::BottomUp));
        let new = ZoneStructure::uniform(1, 1, 1).with_pattern(pattern(BinDirection::BottomUp));

        let current = bins_for(&old);
        let c_id = current
            .iter()
            .find(|b| b.address().ends_with("-C"))
            .unwrap()
            .id_typed();
        let mut item_counts = HashMap::new();
        item_counts.insert(c_id, 5usize);

        let target = StructurePlanner::plan(&new, "WH", "ZN").unwrap();
        let plan = diff(&target, &current, &item_counts);

        assert_eq!(plan.preserve.len(), 1); // A
        assert_eq!(plan.delete_empty.len(), 1); // B
        assert_eq!(plan.occupied.len(), 1); // C
        assert_eq!(plan.occupied[0].item_count, 5);
        assert!(plan.occupied[0].address.ends_with("-C"));

        let preview = plan.preview();
        assert_eq!(preview.bins_to_preserve, 1);
        assert_eq!(preview.bins_to_delete_empty, 1);
        assert_eq!(preview.total_affected_items, 5);
        assert_eq!(preview.total_new_bins, 1);
        assert!(!preview.is_first_configuration);
    }

    #[test]
    fn direction_flip_yields_updates_not_churn() {
        let up = ZoneStructure::uniform(1, 1, 3).with_pattern(pattern(BinDirection::BottomUp));
        let down = ZoneStructure::uniform(1, 1, 3).with_pattern(pattern(BinDirection::TopDown));

        let current = bins_for(&up);
        let target = StructurePlanner::plan(&down, "WH", "ZN").unwrap();
        let plan = diff(&target, &current, &HashMap::new());

        // Address set is identical; A and C swap physical slots, B stays.
        assert_eq!(plan.update.len(), 2);
        assert_eq!(plan.preserve.len(), 1);
        assert!(plan.create.is_empty());
        assert!(plan.delete_empty.is_empty());
    }

    #[test]
    fn occupied_bins_are_never_in_the_delete_bucket() {
        let old = ZoneStructure::uniform(1, 1, 2).with_pattern(pattern(BinDirection::BottomUp));
        let current = bins_for(&old);
        let mut item_counts = HashMap::new();
        for bin in &current {
            item_counts.insert(bin.id_typed(), 1usize);
        }

        let plan = diff(&[], &current, &item_counts);
        assert!(plan.delete_empty.is_empty());
        assert_eq!(plan.occupied.len(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: every address in current UNION target is classified into
        /// exactly one bucket.
        #[test]
        fn diff_conserves_addresses(
            old_aisles in 0u8..=3, old_shelves in 0u16..=3, old_bins in 0u8..=4,
            new_aisles in 0u8..=3, new_shelves in 0u16..=3, new_bins in 0u8..=4,
            occupied_mask in any::<u32>(),
        ) {
            let p = pattern(BinDirection::BottomUp);
            let old = ZoneStructure::uniform(old_aisles, old_shelves, old_bins).with_pattern(p);
            let new = ZoneStructure::uniform(new_aisles, new_shelves, new_bins).with_pattern(p);

            let current = bins_for(&old);
            let mut item_counts = HashMap::new();
            for (i, bin) in current.iter().enumerate() {
                if occupied_mask & (1 << (i % 32)) != 0 {
                    item_counts.insert(bin.id_typed(), 1usize);
                }
            }

            let target = StructurePlanner::plan(&new, "WH", "ZN").unwrap();
            let plan = diff(&target, &current, &item_counts);

            let mut classified: Vec<&str> = Vec::new();
            classified.extend(plan.preserve.iter().map(|b| b.address.as_str()));
            classified.extend(plan.update.iter().map(|b| b.address.as_str()));
            classified.extend(plan.create.iter().map(|b| b.address.as_str()));
            classified.extend(plan.delete_empty.iter().map(|b| b.address.as_str()));
            classified.extend(plan.occupied.iter().map(|b| b.address.as_str()));

            let mut union: HashSet<&str> = HashSet::new();
            union.extend(current.iter().map(|b| b.address()));
            union.extend(target.iter().map(|p| p.address.as_str()));

            // Exactly one bucket per address: no duplicates, full coverage.
            let classified_set: HashSet<&str> = classified.iter().copied().collect();
            prop_assert_eq!(classified.len(), classified_set.len());
            prop_assert_eq!(classified_set, union);

            // Blocking safety: occupied bins never appear in delete_empty.
            for bin in &plan.delete_empty {
                prop_assert_eq!(item_counts.get(&bin.bin_id).copied().unwrap_or(0), 0);
            }
        }
    }
}
