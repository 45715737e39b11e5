//! The ledger-wide event union persisted in the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chaintrack_alerts::{AlertEvent, TemperatureAlert, ThresholdsChanged};
use chaintrack_auth::{LedgerInitialized, RoleEvent, RoleGranted, RoleRevoked};
use chaintrack_batches::{BatchCreated, BatchEvent};
use chaintrack_events::Event;
use chaintrack_products::{ProductCreated, ProductEvent, ProductUpdated};

/// Every fact the ledger records. Replaying these in sequence order rebuilds the full state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    LedgerInitialized(LedgerInitialized),
    RoleGranted(RoleGranted),
    RoleRevoked(RoleRevoked),
    ProductCreated(ProductCreated),
    ProductUpdated(ProductUpdated),
    BatchCreated(BatchCreated),
    TemperatureAlert(TemperatureAlert),
    ThresholdsChanged(ThresholdsChanged),
}

impl DomainEvent {
    /// Typed view into the originating domain module.
    pub(crate) fn route(&self) -> Routed {
        match self {
            DomainEvent::LedgerInitialized(e) => Routed::Role(RoleEvent::LedgerInitialized(e.clone())),
            DomainEvent::RoleGranted(e) => Routed::Role(RoleEvent::RoleGranted(e.clone())),
            DomainEvent::RoleRevoked(e) => Routed::Role(RoleEvent::RoleRevoked(e.clone())),
            DomainEvent::ProductCreated(e) => Routed::Product(ProductEvent::ProductCreated(e.clone())),
            DomainEvent::ProductUpdated(e) => Routed::Product(ProductEvent::ProductUpdated(e.clone())),
            DomainEvent::BatchCreated(e) => Routed::Batch(BatchEvent::BatchCreated(e.clone())),
            DomainEvent::TemperatureAlert(e) => Routed::Alert(AlertEvent::TemperatureAlert(e.clone())),
            DomainEvent::ThresholdsChanged(e) => Routed::Alert(AlertEvent::ThresholdsChanged(e.clone())),
        }
    }
}

pub(crate) enum Routed {
    Role(RoleEvent),
    Product(ProductEvent),
    Batch(BatchEvent),
    Alert(AlertEvent),
}

impl Routed {
    fn event_type(&self) -> &'static str {
        match self {
            Routed::Role(e) => e.event_type(),
            Routed::Product(e) => e.event_type(),
            Routed::Batch(e) => e.event_type(),
            Routed::Alert(e) => e.event_type(),
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Routed::Role(e) => e.occurred_at(),
            Routed::Product(e) => e.occurred_at(),
            Routed::Batch(e) => e.occurred_at(),
            Routed::Alert(e) => e.occurred_at(),
        }
    }
}

/// Type names and timestamps come from the owning module's event.
impl Event for DomainEvent {
    fn event_type(&self) -> &'static str {
        self.route().event_type()
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.route().occurred_at()
    }
}

impl From<RoleEvent> for DomainEvent {
    fn from(value: RoleEvent) -> Self {
        match value {
            RoleEvent::LedgerInitialized(e) => DomainEvent::LedgerInitialized(e),
            RoleEvent::RoleGranted(e) => DomainEvent::RoleGranted(e),
            RoleEvent::RoleRevoked(e) => DomainEvent::RoleRevoked(e),
        }
    }
}

impl From<ProductEvent> for DomainEvent {
    fn from(value: ProductEvent) -> Self {
        match value {
            ProductEvent::ProductCreated(e) => DomainEvent::ProductCreated(e),
            ProductEvent::ProductUpdated(e) => DomainEvent::ProductUpdated(e),
        }
    }
}

impl From<BatchEvent> for DomainEvent {
    fn from(value: BatchEvent) -> Self {
        match value {
            BatchEvent::BatchCreated(e) => DomainEvent::BatchCreated(e),
        }
    }
}

impl From<AlertEvent> for DomainEvent {
    fn from(value: AlertEvent) -> Self {
        match value {
            AlertEvent::ThresholdsChanged(e) => DomainEvent::ThresholdsChanged(e),
            AlertEvent::TemperatureAlert(e) => DomainEvent::TemperatureAlert(e),
        }
    }
}
