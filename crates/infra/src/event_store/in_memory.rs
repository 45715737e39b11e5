use std::sync::RwLock;

use chaintrack_events::{Event, EventEnvelope};

use super::r#trait::{EventStore, EventStoreError};

/// In-memory append-only event log.
///
/// Intended for tests/dev and single-process deployments.
#[derive(Debug)]
pub struct InMemoryEventStore<E> {
    log: RwLock<Vec<EventEnvelope<E>>>,
}

impl<E> InMemoryEventStore<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E> Default for InMemoryEventStore<E> {
    fn default() -> Self {
        Self {
            log: RwLock::new(Vec::new()),
        }
    }
}

impl<E: Event> EventStore<E> for InMemoryEventStore<E> {
    fn append(
        &self,
        events: Vec<E>,
        expected_last: u64,
    ) -> Result<Vec<EventEnvelope<E>>, EventStoreError> {
        if events.is_empty() {
            return Err(EventStoreError::InvalidAppend("empty batch".to_string()));
        }

        let mut log = self.log.write().map_err(|_| EventStoreError::Poisoned)?;

        let current = log.len() as u64;
        if current != expected_last {
            return Err(EventStoreError::Concurrency {
                expected: expected_last,
                actual: current,
            });
        }

        let committed: Vec<EventEnvelope<E>> = events
            .into_iter()
            .zip(current + 1..)
            .map(|(event, sequence)| EventEnvelope::seal(sequence, event))
            .collect();
        log.extend(committed.iter().cloned());

        Ok(committed)
    }

    fn read_from(&self, from: u64, limit: usize) -> Result<Vec<EventEnvelope<E>>, EventStoreError> {
        let log = self.log.read().map_err(|_| EventStoreError::Poisoned)?;

        let start = usize::try_from(from.saturating_sub(1)).unwrap_or(usize::MAX);
        Ok(log.iter().skip(start).take(limit).cloned().collect())
    }

    fn last_sequence(&self) -> Result<u64, EventStoreError> {
        let log = self.log.read().map_err(|_| EventStoreError::Poisoned)?;
        Ok(log.len() as u64)
    }
}
