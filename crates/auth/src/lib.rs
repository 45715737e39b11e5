//! `chaintrack-auth`: role registry (pure authorization lookup, no domain knowledge).
//!
//! This crate is intentionally decoupled from transport and storage: callers arrive as
//! already-authenticated [`Identity`](chaintrack_core::Identity) values.

pub mod registry;
pub mod roles;

pub use registry::{LedgerInitialized, RoleEvent, RoleGranted, RoleRegistry, RoleRevoked};
pub use roles::Role;
