//! Owned container for the whole ledger state.

use chrono::{DateTime, Utc};

use chaintrack_alerts::AlertPolicy;
use chaintrack_auth::RoleRegistry;
use chaintrack_batches::BatchLedger;
use chaintrack_core::Aggregate;
use chaintrack_events::EventEnvelope;
use chaintrack_products::ProductLedger;

use crate::domain_event::{DomainEvent, Routed};
use crate::event_store::r#trait::validate_contiguous;
use crate::event_store::EventStoreError;

/// Every aggregate the ledger owns, plus the log position it reflects.
///
/// State only changes through [`LedgerState::apply`] with committed envelopes, so a
/// state built by replaying the log equals the live state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    roles: RoleRegistry,
    products: ProductLedger,
    batches: BatchLedger,
    alerts: AlertPolicy,
    last_sequence: u64,
    last_commit: Option<DateTime<Utc>>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    pub fn products(&self) -> &ProductLedger {
        &self.products
    }

    pub fn batches(&self) -> &BatchLedger {
        &self.batches
    }

    pub fn alerts(&self) -> &AlertPolicy {
        &self.alerts
    }

    /// Sequence number of the last applied event (0 before any).
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Commit timestamp for the next operation: `now`, but never earlier than the last commit.
    pub fn commit_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.last_commit {
            Some(last) if last > now => last,
            _ => now,
        }
    }

    /// Check that a stored envelope can be applied on top of this state: it directly follows
    /// the last sequence and the ids it carries agree with the arenas.
    ///
    /// Envelopes produced by the ledger always pass; a failure means the log was not written
    /// by it (or was altered) and is reported as `Corrupt`.
    pub fn check(&self, envelope: &EventEnvelope<DomainEvent>) -> Result<(), EventStoreError> {
        validate_contiguous(self.last_sequence, std::slice::from_ref(envelope))?;

        let sequence_number = envelope.sequence_number();
        let corrupt = |reason: String| -> Result<(), EventStoreError> {
            Err(EventStoreError::Corrupt(format!("event {sequence_number}: {reason}")))
        };

        match envelope.payload() {
            DomainEvent::LedgerInitialized(_) if self.roles.is_initialized() => {
                corrupt("ledger initialized twice".to_string())
            }
            DomainEvent::ProductCreated(e) if e.product_id != self.products.next_id() => corrupt(format!(
                "created product {}, expected {}",
                e.product_id,
                self.products.next_id()
            )),
            DomainEvent::ProductUpdated(e) => match self.products.history(e.product_id) {
                Err(_) => corrupt(format!("update of unknown product {}", e.product_id)),
                Ok(history) if e.sequence_number != history.len() as u64 + 1 => corrupt(format!(
                    "update {} of product {}, expected {}",
                    e.sequence_number,
                    e.product_id,
                    history.len() + 1
                )),
                Ok(_) => Ok(()),
            },
            DomainEvent::BatchCreated(e) if e.batch_id != self.batches.next_id() => corrupt(format!(
                "created batch {}, expected {}",
                e.batch_id,
                self.batches.next_id()
            )),
            DomainEvent::BatchCreated(e) => {
                if e.product_ids.is_empty() {
                    return corrupt(format!("batch {} lists no products", e.batch_id));
                }
                match e.product_ids.iter().find(|id| !self.products.contains(**id)) {
                    Some(id) => corrupt(format!("batch {} lists unknown product {id}", e.batch_id)),
                    None => Ok(()),
                }
            }
            DomainEvent::TemperatureAlert(e) if !self.products.contains(e.product_id) => {
                corrupt(format!("alert for unknown product {}", e.product_id))
            }
            DomainEvent::ThresholdsChanged(e) if e.min_temperature > e.max_temperature => corrupt(format!(
                "thresholds {}..{} are inverted",
                e.min_temperature, e.max_temperature
            )),
            _ => Ok(()),
        }
    }

    pub fn apply(&mut self, envelope: &EventEnvelope<DomainEvent>) {
        match envelope.payload().route() {
            Routed::Role(ev) => self.roles.apply(&ev),
            Routed::Product(ev) => self.products.apply(&ev),
            Routed::Batch(ev) => {
                let chaintrack_batches::BatchEvent::BatchCreated(created) = &ev;
                self.products.assign_batch(created.batch_id, &created.product_ids);
                self.batches.apply(&ev);
            }
            Routed::Alert(ev) => self.alerts.apply(&ev),
        }

        self.last_sequence = envelope.sequence_number();
        self.last_commit = Some(self.commit_time(envelope.recorded_at()));
    }
}
