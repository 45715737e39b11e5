//! Domain event plumbing: the event contract, the stored envelope, and pub/sub fan-out.
//!
//! Ordering and durability live in the event store (`chaintrack-infra`); this crate only
//! describes what an event is and how committed events reach in-process subscribers.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
