//! Declarative zone structure: the specification bins are derived from.
//!
//! A `ZoneStructure` never holds bin instances; it only describes how many
//! aisles/shelves/bins a zone has and how their addresses are formatted.

use serde::{Deserialize, Serialize};

use stockgrid_core::{DomainError, DomainResult, ValueObject};

use crate::code_pattern::CodePattern;

/// Schema caps for a single zone.
pub const MAX_AISLES: u8 = 99;
pub const MAX_SHELVES_PER_AISLE: u16 = 999;
pub const MAX_BINS_PER_SHELF: u8 = 26;

/// Per-aisle override of the zone-wide shelf/bin counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AisleConfig {
    pub aisle_number: u8,
    pub shelves_count: u16,
    pub bins_per_shelf: u8,
}

/// Physical dimensions of a zone (metres, presentation only).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width_m: f64,
    pub depth_m: f64,
    pub height_m: f64,
}

/// Zone floor-plan rendering hints. Stored next to the structure, never
/// consulted by the planner or the differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneLayout {
    pub orientation: LayoutOrientation,
    pub origin: LayoutOrigin,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutOrientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutOrigin {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

/// Declarative aisle/shelf/bin layout plus the address code pattern.
///
/// Stored as a structured document attached to the zone row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStructure {
    pub aisles: u8,
    pub shelves_per_aisle: u16,
    pub bins_per_shelf: u8,
    #[serde(default)]
    pub aisle_configs: Vec<AisleConfig>,
    #[serde(default)]
    pub code_pattern: CodePattern,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
}

impl ValueObject for ZoneStructure {}

impl ZoneStructure {
    /// Uniform structure without per-aisle overrides.
    pub fn uniform(aisles: u8, shelves_per_aisle: u16, bins_per_shelf: u8) -> Self {
        Self {
            aisles,
            shelves_per_aisle,
            bins_per_shelf,
            aisle_configs: Vec::new(),
            code_pattern: CodePattern::default(),
            dimensions: None,
        }
    }

    pub fn with_pattern(mut self, code_pattern: CodePattern) -> Self {
        self.code_pattern = code_pattern;
        self
    }

    pub fn with_aisle_configs(mut self, aisle_configs: Vec<AisleConfig>) -> Self {
        self.aisle_configs = aisle_configs;
        self
    }

    /// Validate bounds, aisle-number uniqueness and digit-width fit.
    ///
    /// Must pass before enumeration; all checks run before any mutation
    /// anywhere in the reconfiguration flow.
    pub fn validate(&self) -> DomainResult<()> {
        if self.aisles > MAX_AISLES {
            return Err(DomainError::bad_request(format!(
                "aisles {} exceeds maximum {MAX_AISLES}",
                self.aisles
            )));
        }
        if self.shelves_per_aisle > MAX_SHELVES_PER_AISLE {
            return Err(DomainError::bad_request(format!(
                "shelves_per_aisle {} exceeds maximum {MAX_SHELVES_PER_AISLE}",
                self.shelves_per_aisle
            )));
        }
        if self.bins_per_shelf > MAX_BINS_PER_SHELF {
            return Err(DomainError::bad_request(format!(
                "bins_per_shelf {} exceeds maximum {MAX_BINS_PER_SHELF}",
                self.bins_per_shelf
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for config in &self.aisle_configs {
            if config.aisle_number == 0 || config.aisle_number > MAX_AISLES {
                return Err(DomainError::bad_request(format!(
                    "aisle number {} out of range 1..={MAX_AISLES}",
                    config.aisle_number
                )));
            }
            if !seen.insert(config.aisle_number) {
                return Err(DomainError::bad_request(format!(
                    "duplicate aisle number {} in aisle configs",
                    config.aisle_number
                )));
            }
            if config.shelves_count > MAX_SHELVES_PER_AISLE {
                return Err(DomainError::bad_request(format!(
                    "shelves_count {} for aisle {} exceeds maximum {MAX_SHELVES_PER_AISLE}",
                    config.shelves_count, config.aisle_number
                )));
            }
            if config.bins_per_shelf > MAX_BINS_PER_SHELF {
                return Err(DomainError::bad_request(format!(
                    "bins_per_shelf {} for aisle {} exceeds maximum {MAX_BINS_PER_SHELF}",
                    config.bins_per_shelf, config.aisle_number
                )));
            }
        }

        // The code pattern must be able to express every coordinate the
        // structure implies, otherwise address generation would fail halfway
        // through a bin set.
        for (aisle, shelves, _bins) in self.effective_aisles() {
            if aisle > self.code_pattern.max_aisle() {
                return Err(DomainError::bad_request(format!(
                    "aisle {aisle} does not fit {} digit(s) in the code pattern",
                    self.code_pattern.aisle_digits()
                )));
            }
            if shelves > self.code_pattern.max_shelf() {
                return Err(DomainError::bad_request(format!(
                    "shelf count {shelves} for aisle {aisle} does not fit {} digit(s) in the code pattern",
                    self.code_pattern.shelf_digits()
                )));
            }
        }

        Ok(())
    }

    /// The aisles this structure actually implies, ascending, each as
    /// `(aisle_number, shelves_count, bins_per_shelf)`.
    ///
    /// Without overrides that is `1..=aisles` with the zone defaults; with
    /// overrides it is exactly the configured aisle numbers.
    pub fn effective_aisles(&self) -> Vec<(u8, u16, u8)> {
        if self.aisle_configs.is_empty() {
            (1..=self.aisles)
                .map(|a| (a, self.shelves_per_aisle, self.bins_per_shelf))
                .collect()
        } else {
            let mut aisles: Vec<(u8, u16, u8)> = self
                .aisle_configs
                .iter()
                .map(|c| (c.aisle_number, c.shelves_count, c.bins_per_shelf))
                .collect();
            aisles.sort_by_key(|(a, _, _)| *a);
            aisles
        }
    }

    pub fn total_aisles(&self) -> u32 {
        self.effective_aisles().len() as u32
    }

    pub fn total_shelves(&self) -> u32 {
        self.effective_aisles()
            .iter()
            .map(|(_, shelves, _)| u32::from(*shelves))
            .sum()
    }

    pub fn total_bins(&self) -> u32 {
        self.effective_aisles()
            .iter()
            .map(|(_, shelves, bins)| u32::from(*shelves) * u32::from(*bins))
            .sum()
    }
}
