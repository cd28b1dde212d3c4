//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** — identity does
/// not matter, only the attribute values do. A `CodePattern` with separator
/// `'-'` and two aisle digits equals any other pattern with those values.
///
/// To "modify" a value object, construct a new one. Immutability keeps value
/// objects safe to share across threads and trivially comparable in tests.
///
/// The trait requires `Clone` (values are cheap to copy), `PartialEq`
/// (compared by attributes) and `Debug` (loggable/testable).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
