//! Products domain module (event-sourced).
//!
//! Owns product records and their append-only update history. Decisions are pure functions
//! of the current state plus the role registry and alert policy; state changes only through
//! `apply`.

pub mod product;
pub mod qr;

pub use product::{
    CreateProduct, Product, ProductCreated, ProductEvent, ProductLedger, ProductStatus,
    ProductUpdated, Update, UpdateOutcome, UpdateProduct,
};
pub use qr::QrCodeTemplate;
