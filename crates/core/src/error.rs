//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures: every variant is a pure function of
/// (current state, input). Storage and transport failures belong to the layers that
/// own them and must not be folded into these kinds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The caller does not hold the role the operation requires.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A referenced product, batch or update does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input was rejected (empty name, empty batch, inverted thresholds, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The ledger already has an admin.
    #[error("ledger already initialized")]
    AlreadyInitialized,
}

impl DomainError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Stable machine-readable kind, used by transports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Unauthorized(_) => "unauthorized",
            DomainError::NotFound(_) => "not_found",
            DomainError::InvalidInput(_) => "invalid_input",
            DomainError::AlreadyInitialized => "already_initialized",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(DomainError::unauthorized("x").kind(), "unauthorized");
        assert_eq!(DomainError::not_found("x").kind(), "not_found");
        assert_eq!(DomainError::invalid_input("x").kind(), "invalid_input");
        assert_eq!(DomainError::AlreadyInitialized.kind(), "already_initialized");
    }

    #[test]
    fn display_includes_context() {
        let err = DomainError::not_found("product 7");
        assert_eq!(err.to_string(), "not found: product 7");
    }
}
