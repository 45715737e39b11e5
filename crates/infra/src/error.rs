use thiserror::Error;

use chaintrack_core::DomainError;

use crate::event_store::EventStoreError;

/// Failure of a ledger operation.
///
/// Domain failures are deterministic in (state, input) and commit nothing. Store failures
/// also commit nothing: a batch is appended whole or not at all.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("event store: {0}")]
    Store(#[from] EventStoreError),

    /// A writer panicked while holding the state lock.
    #[error("ledger state lock poisoned")]
    Poisoned,
}

impl LedgerError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            LedgerError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
