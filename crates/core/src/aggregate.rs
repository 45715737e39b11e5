//! Aggregate trait for event-sourced ledger state.

/// State that evolves only by applying committed events.
///
/// Decision logic lives in inherent methods on each aggregate (they need different
/// collaborators: the role registry, the alert thresholds, the product arena). What every
/// aggregate shares is the evolution half:
///
/// - `apply(&mut self, event)` is deterministic and infallible;
/// - replaying the same events on an empty aggregate yields the same state.
///
/// Aggregates must not perform IO or side effects.
pub trait Aggregate {
    type Event: Clone + core::fmt::Debug;

    /// Evolve in-memory state from a single committed event.
    fn apply(&mut self, event: &Self::Event);

    /// Number of events applied so far.
    fn version(&self) -> u64;
}
