use std::collections::VecDeque;
use std::marker::PhantomData;

use chaintrack_events::EventEnvelope;

use super::r#trait::{EventStore, EventStoreError};

/// Lazy, finite replay of the log.
///
/// The upper bound is fixed when the tail is created: events appended afterwards are not
/// yielded, so iteration always terminates. Events are fetched a page at a time, each page
/// under the store's read lock, so writers are never blocked for the whole replay.
///
/// Restart a replay by creating a new tail from the last sequence number seen plus one.
pub struct Tail<'a, S, E> {
    store: &'a S,
    next: u64,
    end: u64,
    page_size: usize,
    buffered: VecDeque<EventEnvelope<E>>,
    _event: PhantomData<fn() -> E>,
}

impl<'a, S, E> Tail<'a, S, E>
where
    S: EventStore<E>,
{
    pub const DEFAULT_PAGE_SIZE: usize = 256;

    /// Tail from `from` (inclusive; 0 is treated as 1) up to the log's current end.
    pub fn new(store: &'a S, from: u64) -> Result<Self, EventStoreError> {
        let end = store.last_sequence()?;
        Ok(Self::bounded(store, from, end))
    }

    /// Tail from `from` up to and including `end`.
    pub fn bounded(store: &'a S, from: u64, end: u64) -> Self {
        Self {
            store,
            next: from.max(1),
            end,
            page_size: Self::DEFAULT_PAGE_SIZE,
            buffered: VecDeque::new(),
            _event: PhantomData,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Last sequence number this tail will yield.
    pub fn end(&self) -> u64 {
        self.end
    }

    fn fill(&mut self) -> Result<(), EventStoreError> {
        let remaining = usize::try_from(self.end - self.next + 1).unwrap_or(usize::MAX);
        let page = self.store.read_from(self.next, self.page_size.min(remaining))?;
        if page.is_empty() {
            return Err(EventStoreError::Corrupt(format!(
                "log ends before sequence {} (expected up to {})",
                self.next, self.end
            )));
        }
        self.buffered.extend(page);
        Ok(())
    }
}

impl<S, E> Iterator for Tail<'_, S, E>
where
    S: EventStore<E>,
{
    type Item = Result<EventEnvelope<E>, EventStoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.end {
            return None;
        }

        if self.buffered.is_empty() {
            if let Err(err) = self.fill() {
                // Stop after reporting the failure once.
                self.next = self.end + 1;
                return Some(Err(err));
            }
        }

        let envelope = self.buffered.pop_front()?;
        self.next = envelope.sequence_number() + 1;
        Some(Ok(envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::InMemoryEventStore;
    use chaintrack_events::Event;
    use chrono::{DateTime, Utc};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Tick(DateTime<Utc>);

    impl Event for Tick {
        fn event_type(&self) -> &'static str {
            "test.tick"
        }

        fn version(&self) -> u32 {
            1
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn store_with(n: usize) -> InMemoryEventStore<Tick> {
        let store = InMemoryEventStore::new();
        if n > 0 {
            store.append(vec![Tick(Utc::now()); n], 0).unwrap();
        }
        store
    }

    fn sequences<S: EventStore<Tick>>(tail: Tail<'_, S, Tick>) -> Vec<u64> {
        tail.map(|r| r.unwrap().sequence_number()).collect()
    }

    #[test]
    fn yields_everything_from_the_start_across_pages() {
        let store = store_with(7);
        let tail = Tail::new(&store, 1).unwrap().with_page_size(3);
        assert_eq!(sequences(tail), (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn restarts_from_any_sequence() {
        let store = store_with(5);
        assert_eq!(sequences(Tail::new(&store, 4).unwrap()), vec![4, 5]);
        assert_eq!(sequences(Tail::new(&store, 0).unwrap()).len(), 5);
        assert!(sequences(Tail::new(&store, 6).unwrap()).is_empty());
    }

    #[test]
    fn bound_is_fixed_at_creation() {
        let store = store_with(2);
        let mut tail = Tail::new(&store, 1).unwrap().with_page_size(1);
        assert_eq!(tail.next().unwrap().unwrap().sequence_number(), 1);

        store.append(vec![Tick(Utc::now())], 2).unwrap();

        let rest: Vec<u64> = tail.map(|r| r.unwrap().sequence_number()).collect();
        assert_eq!(rest, vec![2]);
    }

    #[test]
    fn empty_log_yields_nothing() {
        let store = store_with(0);
        assert!(Tail::new(&store, 1).unwrap().next().is_none());
    }

    #[test]
    fn bound_past_the_log_reports_corruption_once() {
        let store = store_with(1);
        let mut tail = Tail::bounded(&store, 1, 3);
        assert!(tail.next().unwrap().is_ok());
        assert!(matches!(tail.next(), Some(Err(EventStoreError::Corrupt(_)))));
        assert!(tail.next().is_none());
    }
}
