//! `stockgrid-warehouse` — warehouse addressing & structure engine.
//!
//! The pure half of the warehouse subsystem:
//!
//! - [`address`]: bin address codec (generate/parse)
//! - [`planner`]: deterministic enumeration of the bin set a structure implies
//! - [`reconfig`]: diff between a new structure and the persisted bins
//! - [`bin`]/[`warehouse`]/[`zone`]/[`location`]: the hierarchy entities
//! - [`capacity`]: the shared occupancy/capacity invariant
//!
//! Repositories and the orchestration around them live in `stockgrid-infra`.

pub mod address;
pub mod bin;
pub mod capacity;
pub mod code_pattern;
pub mod events;
pub mod item;
pub mod location;
pub mod planner;
pub mod reconfig;
pub mod structure;
pub mod warehouse;
pub mod zone;

pub use address::{AddressCodec, ParsedAddress, is_valid_code};
pub use bin::{Bin, BinId};
pub use capacity::CapacityGauge;
pub use code_pattern::{BinDirection, BinLabeling, CodePattern};
pub use events::WarehouseEvent;
pub use item::{ItemId, StockItem};
pub use location::{Location, LocationId, LocationType};
pub use planner::{BinSlot, PlannedBin, StructurePlanner, StructurePreview};
pub use reconfig::{
    BinRef, BinUpdate, OccupiedBin, ReconfigurationFlags, ReconfigurationOutcome,
    ReconfigurationPlan, ReconfigurationPreview, diff, removal_block_reason,
};
pub use structure::{AisleConfig, Dimensions, ZoneLayout, ZoneStructure};
pub use warehouse::{Warehouse, WarehouseId};
pub use zone::{Zone, ZoneId};
