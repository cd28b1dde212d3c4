//! Optimistic concurrency primitives.

use crate::error::{DomainError, DomainResult};

/// Optimistic concurrency expectation for a versioned entity.
///
/// Entities that are mutated concurrently (bins under item movement, for
/// example) carry a monotonically increasing version; updates state the
/// version they were computed against and fail with [`DomainError::Conflict`]
/// when the stored row has moved on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (useful for idempotent writes, migrations, etc.).
    Any,
    /// Require the entity to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}
