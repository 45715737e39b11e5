use std::sync::Arc;

use thiserror::Error;

use chaintrack_events::{Event, EventEnvelope};

/// Event store operation error.
///
/// These are infrastructure errors (storage, concurrency, log integrity) as opposed to
/// domain errors (authorization, validation).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventStoreError {
    /// Optimistic concurrency check failed: another writer appended first.
    #[error("optimistic concurrency check failed: expected last sequence {expected}, found {actual}")]
    Concurrency { expected: u64, actual: u64 },

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    /// The stored log is not a gap-free sequence starting at 1.
    #[error("corrupt event log: {0}")]
    Corrupt(String),

    #[error("event store lock poisoned")]
    Poisoned,
}

/// Append-only event log with one global sequence.
///
/// ## Append semantics
///
/// `append()`:
/// - checks that the log still ends at `expected_last` (optimistic concurrency)
/// - assigns sequence numbers `expected_last + 1 ..` in the order given
/// - persists the batch atomically (all events or none)
///
/// ## Read semantics
///
/// `read_from()` returns up to `limit` events with `sequence_number >= from`, in order.
/// Reads never observe a partially appended batch.
pub trait EventStore<E>: Send + Sync {
    fn append(
        &self,
        events: Vec<E>,
        expected_last: u64,
    ) -> Result<Vec<EventEnvelope<E>>, EventStoreError>;

    fn read_from(&self, from: u64, limit: usize) -> Result<Vec<EventEnvelope<E>>, EventStoreError>;

    /// Sequence number of the newest event, or 0 for an empty log.
    fn last_sequence(&self) -> Result<u64, EventStoreError>;
}

impl<E, S> EventStore<E> for Arc<S>
where
    S: EventStore<E> + ?Sized,
{
    fn append(
        &self,
        events: Vec<E>,
        expected_last: u64,
    ) -> Result<Vec<EventEnvelope<E>>, EventStoreError> {
        (**self).append(events, expected_last)
    }

    fn read_from(&self, from: u64, limit: usize) -> Result<Vec<EventEnvelope<E>>, EventStoreError> {
        (**self).read_from(from, limit)
    }

    fn last_sequence(&self) -> Result<u64, EventStoreError> {
        (**self).last_sequence()
    }
}

/// Check that `page` continues the log right after `last` with no gaps.
///
/// Returns the sequence number of the last event in the page.
pub fn validate_contiguous<E: Event>(last: u64, page: &[EventEnvelope<E>]) -> Result<u64, EventStoreError> {
    let mut expected = last + 1;
    for env in page {
        if env.sequence_number() != expected {
            return Err(EventStoreError::Corrupt(format!(
                "expected sequence {expected}, found {} ({})",
                env.sequence_number(),
                env.event_type()
            )));
        }
        expected += 1;
    }
    Ok(expected - 1)
}
