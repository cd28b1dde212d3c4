//! Structure planner: enumerate the bin set a structure implies.
//!
//! Enumeration is a finite, restartable, deterministic lazy sequence:
//! aisle-major, then shelf, then position, all ascending. Previews take a
//! truncated prefix of that sequence (never a random sample) so they are
//! stable across runs.

use serde::Serialize;

use stockgrid_core::DomainResult;

use crate::address::AddressCodec;
use crate::code_pattern::BinDirection;
use crate::structure::ZoneStructure;

/// Number of sample addresses included in a preview.
pub const PREVIEW_SAMPLE_LIMIT: usize = 10;

/// One physical bin slot implied by a structure.
///
/// `position` is the physical slot on the shelf (1-based), independent of
/// labeling direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinSlot {
    pub aisle: u8,
    pub shelf: u16,
    pub position: u8,
}

/// A bin slot together with its generated address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBin {
    pub aisle: u8,
    pub shelf: u16,
    pub position: u8,
    pub address: String,
}

/// Summary counts for a structure preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructurePreview {
    pub total_bins: u32,
    pub total_shelves: u32,
    pub total_aisles: u32,
    pub sample_bins: Vec<String>,
}

/// Deterministic enumeration over a [`ZoneStructure`].
pub struct StructurePlanner;

impl StructurePlanner {
    /// Lazily yield every `(aisle, shelf, position)` triple the structure
    /// implies. Callers may restart by calling `enumerate` again.
    ///
    /// Assumes a validated structure; unvalidated input yields whatever the
    /// raw counts say.
    pub fn enumerate(structure: &ZoneStructure) -> impl Iterator<Item = BinSlot> {
        structure
            .effective_aisles()
            .into_iter()
            .flat_map(|(aisle, shelves, bins)| {
                (1..=shelves).flat_map(move |shelf| {
                    (1..=bins).map(move |position| BinSlot {
                        aisle,
                        shelf,
                        position,
                    })
                })
            })
    }

    /// Map a physical slot to its label index under the given direction.
    ///
    /// `BottomUp` labels slot 1 as the first label; `TopDown` labels the
    /// topmost slot first, so the mapping is mirrored within the shelf.
    pub fn label_index(direction: BinDirection, bins_per_shelf: u8, position: u8) -> u8 {
        match direction {
            BinDirection::BottomUp => position,
            BinDirection::TopDown => bins_per_shelf + 1 - position,
        }
    }

    /// Validate, enumerate and address every bin the structure implies.
    pub fn plan(
        structure: &ZoneStructure,
        warehouse_code: &str,
        zone_code: &str,
    ) -> DomainResult<Vec<PlannedBin>> {
        structure.validate()?;
        let codec = AddressCodec::new(structure.code_pattern);
        let direction = structure.code_pattern.bin_direction();

        let mut planned = Vec::with_capacity(structure.total_bins() as usize);
        for (aisle, shelves, bins) in structure.effective_aisles() {
            for shelf in 1..=shelves {
                for position in 1..=bins {
                    let label = Self::label_index(direction, bins, position);
                    let address = codec.generate(warehouse_code, zone_code, aisle, shelf, label)?;
                    planned.push(PlannedBin {
                        aisle,
                        shelf,
                        position,
                        address,
                    });
                }
            }
        }
        Ok(planned)
    }

    /// Summary counts plus a deterministic sample prefix.
    pub fn preview(
        structure: &ZoneStructure,
        warehouse_code: &str,
        zone_code: &str,
    ) -> DomainResult<StructurePreview> {
        structure.validate()?;
        let codec = AddressCodec::new(structure.code_pattern);
        let direction = structure.code_pattern.bin_direction();

        let mut sample_bins = Vec::with_capacity(PREVIEW_SAMPLE_LIMIT);
        'outer: for (aisle, shelves, bins) in structure.effective_aisles() {
            for shelf in 1..=shelves {
                for position in 1..=bins {
                    if sample_bins.len() >= PREVIEW_SAMPLE_LIMIT {
                        break 'outer;
                    }
                    let label = Self::label_index(direction, bins, position);
                    sample_bins.push(codec.generate(warehouse_code, zone_code, aisle, shelf, label)?);
                }
            }
        }

        Ok(StructurePreview {
            total_bins: structure.total_bins(),
            total_shelves: structure.total_shelves(),
            total_aisles: structure.total_aisles(),
            sample_bins,
        })
    }
}
