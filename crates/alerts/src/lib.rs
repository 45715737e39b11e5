//! Temperature alerting.
//!
//! Thresholds are global to the ledger. Evaluation is a pure comparison; the ledger runs it
//! inline while deciding every product update and commits the resulting alert together
//! with the update.

pub mod policy;
pub mod temperature;

pub use policy::{
    AlertConfig, AlertDecision, AlertEvent, AlertPolicy, Breach, TemperatureAlert, ThresholdsChanged,
};
pub use temperature::Temperature;
