//! Shared occupancy/capacity invariant.
//!
//! Both the `Bin` entity and the generic `Location` model enforce the same
//! rule: `0 <= current <= capacity` whenever a capacity is set. The rule
//! lives here once and is composed into both.

use serde::{Deserialize, Serialize};

use stockgrid_core::{DomainError, DomainResult, ValueObject};

/// Occupancy threshold (percent) above which a slot counts as near capacity.
pub const NEAR_CAPACITY_THRESHOLD: f64 = 90.0;

/// Occupancy counter with an optional upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityGauge {
    capacity: Option<u32>,
    current: u32,
}

impl ValueObject for CapacityGauge {}

impl CapacityGauge {
    /// Empty gauge with the given bound (`None` = uncapped).
    pub fn new(capacity: Option<u32>) -> Self {
        Self {
            capacity,
            current: 0,
        }
    }

    pub fn uncapped() -> Self {
        Self::new(None)
    }

    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    /// Add occupancy. `n` must be positive; fails when the bound would be
    /// exceeded, leaving the gauge unchanged.
    pub fn add(&mut self, n: u32) -> DomainResult<()> {
        if n == 0 {
            return Err(DomainError::invalid_operation(
                "occupancy delta must be positive",
            ));
        }
        let next = self.current.checked_add(n).ok_or_else(|| {
            DomainError::capacity_exceeded("occupancy counter overflow")
        })?;
        if let Some(capacity) = self.capacity {
            if next > capacity {
                return Err(DomainError::capacity_exceeded(format!(
                    "adding {n} would put occupancy at {next}, above capacity {capacity}"
                )));
            }
        }
        self.current = next;
        Ok(())
    }

    /// Remove occupancy. `n` must be positive and no larger than the current
    /// level.
    pub fn remove(&mut self, n: u32) -> DomainResult<()> {
        if n == 0 {
            return Err(DomainError::invalid_operation(
                "occupancy delta must be positive",
            ));
        }
        if n > self.current {
            return Err(DomainError::invalid_operation(format!(
                "cannot remove {n} from occupancy {}",
                self.current
            )));
        }
        self.current -= n;
        Ok(())
    }

    /// Change the bound. Never clamps: a bound below the current level is
    /// rejected.
    pub fn set_capacity(&mut self, capacity: Option<u32>) -> DomainResult<()> {
        if let Some(c) = capacity {
            if c < self.current {
                return Err(DomainError::bad_request(format!(
                    "capacity {c} is below current occupancy {}",
                    self.current
                )));
            }
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Remaining room, `None` when uncapped.
    pub fn available(&self) -> Option<u32> {
        self.capacity.map(|c| c - self.current)
    }

    /// Occupancy as a percentage of capacity, `None` when uncapped.
    /// A zero-capacity gauge is always at 100%.
    pub fn percentage(&self) -> Option<f64> {
        self.capacity.map(|c| {
            if c == 0 {
                100.0
            } else {
                f64::from(self.current) / f64::from(c) * 100.0
            }
        })
    }

    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|c| self.current >= c)
    }

    pub fn is_near_capacity(&self) -> bool {
        self.percentage()
            .is_some_and(|p| p >= NEAR_CAPACITY_THRESHOLD)
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }
}
