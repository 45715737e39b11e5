//! `chaintrack-core`: shared domain building blocks for the tracking ledger.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod id;

pub use aggregate::Aggregate;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::{BatchId, Identity, ProductId};
