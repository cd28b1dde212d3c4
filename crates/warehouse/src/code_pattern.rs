//! Address code pattern: formatting rules for bin addresses.
//!
//! The pattern governs how structural coordinates become a human-readable
//! address string. It never affects capacity or occupancy semantics.

use serde::{Deserialize, Serialize};

use stockgrid_core::{DomainError, DomainResult, ValueObject};

/// How bin positions are rendered in an address segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinLabeling {
    /// A, B, C, ... (positions are capped at 26 per shelf).
    Letters,
    /// 01, 02, ... zero-padded to two digits.
    Numbers,
}

/// Physical reference point for position labels on a shelf.
///
/// Affects only which physical slot gets which label; uniqueness and
/// round-trip behaviour of addresses are unchanged by the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinDirection {
    BottomUp,
    TopDown,
}

fn default_separator() -> char {
    '-'
}

fn default_aisle_digits() -> u8 {
    1
}

fn default_shelf_digits() -> u8 {
    2
}

fn default_labeling() -> BinLabeling {
    BinLabeling::Letters
}

fn default_direction() -> BinDirection {
    BinDirection::BottomUp
}

/// Formatting rules for bin addresses.
///
/// Stored as a structured document on the zone row; defaults are applied at
/// construction/deserialization time so older documents stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePattern {
    #[serde(default = "default_separator")]
    separator: char,
    #[serde(default = "default_aisle_digits")]
    aisle_digits: u8,
    #[serde(default = "default_shelf_digits")]
    shelf_digits: u8,
    #[serde(default = "default_labeling")]
    bin_labeling: BinLabeling,
    #[serde(default = "default_direction")]
    bin_direction: BinDirection,
}

impl ValueObject for CodePattern {}

impl Default for CodePattern {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            aisle_digits: default_aisle_digits(),
            shelf_digits: default_shelf_digits(),
            bin_labeling: default_labeling(),
            bin_direction: default_direction(),
        }
    }
}

impl CodePattern {
    /// Validated constructor.
    ///
    /// The separator must be a single non-alphanumeric character so it can
    /// never collide with warehouse/zone codes or digit segments during
    /// parsing.
    pub fn new(
        separator: char,
        aisle_digits: u8,
        shelf_digits: u8,
        bin_labeling: BinLabeling,
        bin_direction: BinDirection,
    ) -> DomainResult<Self> {
        if separator.is_ascii_alphanumeric() || !separator.is_ascii() {
            return Err(DomainError::bad_request(format!(
                "separator {separator:?} must be a single non-alphanumeric ASCII character"
            )));
        }
        if !(1..=2).contains(&aisle_digits) {
            return Err(DomainError::bad_request(format!(
                "aisle_digits must be 1 or 2, got {aisle_digits}"
            )));
        }
        if !(2..=3).contains(&shelf_digits) {
            return Err(DomainError::bad_request(format!(
                "shelf_digits must be 2 or 3, got {shelf_digits}"
            )));
        }
        Ok(Self {
            separator,
            aisle_digits,
            shelf_digits,
            bin_labeling,
            bin_direction,
        })
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn aisle_digits(&self) -> u8 {
        self.aisle_digits
    }

    pub fn shelf_digits(&self) -> u8 {
        self.shelf_digits
    }

    pub fn bin_labeling(&self) -> BinLabeling {
        self.bin_labeling
    }

    pub fn bin_direction(&self) -> BinDirection {
        self.bin_direction
    }

    /// Largest aisle number expressible under the configured digit width
    /// (schema cap: 99).
    pub fn max_aisle(&self) -> u8 {
        match self.aisle_digits {
            1 => 9,
            _ => 99,
        }
    }

    /// Largest shelf number expressible under the configured digit width
    /// (schema cap: 999).
    pub fn max_shelf(&self) -> u16 {
        match self.shelf_digits {
            2 => 99,
            _ => 999,
        }
    }
}
