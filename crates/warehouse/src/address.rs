//! Bin address codec: structural coordinates <-> address strings.
//!
//! Addresses are the only storage-bin identifier humans see, so the codec
//! is strict in both directions: `generate` refuses coordinates that do not
//! fit the configured digit widths, and `parse` refuses anything that
//! `generate` could not have produced. Together that gives the round-trip
//! contract `parse(generate(x)) == x` and per-pattern injectivity, which is
//! what makes address uniqueness enforceable at the bin level.

use serde::{Deserialize, Serialize};

use stockgrid_core::{DomainError, DomainResult};

use crate::code_pattern::{BinLabeling, CodePattern};

/// Minimum/maximum length of a warehouse or zone code.
pub const CODE_MIN_LEN: usize = 2;
pub const CODE_MAX_LEN: usize = 5;

/// Positions per shelf are capped by the schema at 26 (one letter).
pub const MAX_POSITIONS_PER_SHELF: u8 = 26;

/// Check a warehouse/zone code: 2-5 uppercase ASCII alphanumerics.
///
/// Lowercase input is rejected, not coerced.
pub fn is_valid_code(code: &str) -> bool {
    (CODE_MIN_LEN..=CODE_MAX_LEN).contains(&code.len())
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Structural coordinates recovered from an address string.
///
/// `position` is the *label index* (1-based), which equals the physical slot
/// only under `BinDirection::BottomUp`; the planner owns that mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAddress {
    pub warehouse_code: String,
    pub zone_code: String,
    pub aisle: u8,
    pub shelf: u16,
    pub position: u8,
}

/// Pure address codec for a single [`CodePattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressCodec {
    pattern: CodePattern,
}

impl AddressCodec {
    pub fn new(pattern: CodePattern) -> Self {
        Self { pattern }
    }

    pub fn pattern(&self) -> &CodePattern {
        &self.pattern
    }

    /// Build the address for the given coordinates.
    ///
    /// `label_index` is the direction-adjusted position label (1-based).
    /// Segment order is fixed: warehouse, zone, aisle, shelf, position.
    pub fn generate(
        &self,
        warehouse_code: &str,
        zone_code: &str,
        aisle: u8,
        shelf: u16,
        label_index: u8,
    ) -> DomainResult<String> {
        if !is_valid_code(warehouse_code) {
            return Err(DomainError::bad_request(format!(
                "invalid warehouse code {warehouse_code:?}"
            )));
        }
        if !is_valid_code(zone_code) {
            return Err(DomainError::bad_request(format!(
                "invalid zone code {zone_code:?}"
            )));
        }
        if aisle == 0 || aisle > self.pattern.max_aisle() {
            return Err(DomainError::bad_request(format!(
                "aisle {aisle} does not fit {} digit(s)",
                self.pattern.aisle_digits()
            )));
        }
        if shelf == 0 || shelf > self.pattern.max_shelf() {
            return Err(DomainError::bad_request(format!(
                "shelf {shelf} does not fit {} digit(s)",
                self.pattern.shelf_digits()
            )));
        }
        if label_index == 0 || label_index > MAX_POSITIONS_PER_SHELF {
            return Err(DomainError::bad_request(format!(
                "position label index {label_index} out of range 1..={MAX_POSITIONS_PER_SHELF}"
            )));
        }

        let sep = self.pattern.separator();
        let aw = usize::from(self.pattern.aisle_digits());
        let sw = usize::from(self.pattern.shelf_digits());
        let position = self.format_position(label_index);

        Ok(format!(
            "{warehouse_code}{sep}{zone_code}{sep}{aisle:0aw$}{sep}{shelf:0sw$}{sep}{position}"
        ))
    }

    /// Recover coordinates from an address string (purely syntactic).
    ///
    /// Existence checks against storage live in the addressing service, not
    /// here.
    pub fn parse(&self, address: &str) -> DomainResult<ParsedAddress> {
        let sep = self.pattern.separator();
        let segments: Vec<&str> = address.split(sep).collect();
        if segments.len() != 5 {
            return Err(DomainError::malformed_address(format!(
                "{address:?}: expected 5 segments separated by {sep:?}, got {}",
                segments.len()
            )));
        }

        let warehouse_code = segments[0];
        let zone_code = segments[1];
        if !is_valid_code(warehouse_code) {
            return Err(DomainError::malformed_address(format!(
                "{address:?}: bad warehouse code segment {warehouse_code:?}"
            )));
        }
        if !is_valid_code(zone_code) {
            return Err(DomainError::malformed_address(format!(
                "{address:?}: bad zone code segment {zone_code:?}"
            )));
        }

        let aisle = parse_numeric_segment(address, "aisle", segments[2], self.pattern.aisle_digits())?;
        if aisle == 0 || aisle > u16::from(self.pattern.max_aisle()) {
            return Err(DomainError::malformed_address(format!(
                "{address:?}: aisle {aisle} out of range"
            )));
        }
        let shelf = parse_numeric_segment(address, "shelf", segments[3], self.pattern.shelf_digits())?;
        if shelf == 0 || shelf > self.pattern.max_shelf() {
            return Err(DomainError::malformed_address(format!(
                "{address:?}: shelf {shelf} out of range"
            )));
        }

        let position = self.parse_position(address, segments[4])?;

        Ok(ParsedAddress {
            warehouse_code: warehouse_code.to_string(),
            zone_code: zone_code.to_string(),
            aisle: aisle as u8,
            shelf,
            position,
        })
    }

    fn format_position(&self, label_index: u8) -> String {
        match self.pattern.bin_labeling() {
            BinLabeling::Letters => {
                char::from(b'A' + label_index - 1).to_string()
            }
            BinLabeling::Numbers => format!("{label_index:02}"),
        }
    }

    fn parse_position(&self, address: &str, segment: &str) -> DomainResult<u8> {
        match self.pattern.bin_labeling() {
            BinLabeling::Letters => {
                let mut chars = segment.chars();
                match (chars.next(), chars.next()) {
                    (Some(c @ 'A'..='Z'), None) => Ok(c as u8 - b'A' + 1),
                    _ => Err(DomainError::malformed_address(format!(
                        "{address:?}: position segment {segment:?} is not a single letter A-Z"
                    ))),
                }
            }
            BinLabeling::Numbers => {
                let value = parse_numeric_segment(address, "position", segment, 2)?;
                if value == 0 || value > u16::from(MAX_POSITIONS_PER_SHELF) {
                    return Err(DomainError::malformed_address(format!(
                        "{address:?}: position {value} out of range 1..={MAX_POSITIONS_PER_SHELF}"
                    )));
                }
                Ok(value as u8)
            }
        }
    }
}

fn parse_numeric_segment(
    address: &str,
    name: &str,
    segment: &str,
    width: u8,
) -> DomainResult<u16> {
    if segment.len() != usize::from(width) || !segment.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::malformed_address(format!(
            "{address:?}: {name} segment {segment:?} is not {width} digit(s)"
        )));
    }
    segment
        .parse::<u16>()
        .map_err(|e| DomainError::malformed_address(format!("{address:?}: {name}: {e}")))
}
