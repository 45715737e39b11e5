//! Infrastructure layer: the event log, configuration, and the single-writer ledger that
//! composes the domain crates.

pub mod config;
pub mod domain_event;
pub mod error;
pub mod event_store;
pub mod ledger;
pub mod state;


pub use config::{ConfigError, LedgerConfig};
pub use domain_event::DomainEvent;
pub use error::{LedgerError, LedgerResult};
pub use event_store::{EventStore, EventStoreError, InMemoryEventStore, Tail};
pub use ledger::{InMemoryLedger, SupplyChainLedger, UpdateReceipt};
pub use state::LedgerState;
