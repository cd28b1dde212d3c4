//! `stockgrid-events` — event trait, envelope and pub/sub mechanics.
//!
//! Domain crates define the event payloads; this crate only provides the
//! contract and a best-effort in-memory transport.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;
pub mod tenant;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use tenant::TenantScoped;
