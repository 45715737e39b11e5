//! Batches domain module (event-sourced).
//!
//! A batch groups existing products under one sequential id. Creating a batch also stamps
//! the batch id onto every member product; the products crate performs that evolution step.

pub mod batch;
pub mod policy;

pub use batch::{Batch, BatchCreated, BatchEvent, BatchLedger, CreateBatch};
pub use policy::RebatchPolicy;
