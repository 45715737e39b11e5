//! Append-only, globally ordered event log.
//!
//! The log is the ledger's durable artefact: every committed operation appends one atomic
//! batch, and replaying the log in sequence order rebuilds the full ledger state.

pub mod in_memory;
pub mod tail;
pub mod r#trait;

pub use in_memory::InMemoryEventStore;
pub use tail::Tail;
pub use r#trait::{EventStore, EventStoreError};
