//! HTTP API: server, routing, and request/response mapping for the tracking ledger.

pub mod app;
pub mod context;
pub mod middleware;
