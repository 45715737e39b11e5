//! Single-writer composition of the domain modules.
//!
//! Every mutation runs the same pipeline while holding the state write lock:
//!
//! ```text
//! caller
//!   ↓
//! 1. Decide events from the current state (pure; authorization and validation happen here)
//!   ↓
//! 2. Append the events to the store as one batch (optimistic check on the last sequence)
//!   ↓
//! 3. Apply the committed envelopes to the state
//!   ↓
//! 4. Publish the envelopes to bus subscribers (best-effort)
//! ```
//!
//! A failed decision or append leaves state, log and id counters untouched. Reads take the
//! read lock and therefore only ever see fully applied operations.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use chaintrack_alerts::{AlertConfig, Temperature, TemperatureAlert};
use chaintrack_auth::Role;
use chaintrack_batches::{Batch, CreateBatch};
use chaintrack_core::{BatchId, Clock, DomainResult, Identity, ProductId, SystemClock};
use chaintrack_events::{EventBus, EventEnvelope, InMemoryEventBus, Subscription};
use chaintrack_products::{CreateProduct, Product, Update, UpdateProduct};

use crate::config::LedgerConfig;
use crate::domain_event::DomainEvent;
use crate::error::{LedgerError, LedgerResult};
use crate::event_store::{EventStore, InMemoryEventStore, Tail};
use crate::state::LedgerState;

/// Result of a committed product update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReceipt {
    pub product_id: ProductId,
    pub sequence_number: u64,
    /// Present when the reading was out of range; committed in the same batch as the update.
    pub alert: Option<TemperatureAlert>,
}

/// The asset-tracking ledger.
///
/// - `S`: event store holding the ordered log (the durable artefact)
/// - `B`: pub/sub bus for push delivery of committed events
pub struct SupplyChainLedger<S, B> {
    config: LedgerConfig,
    state: RwLock<LedgerState>,
    store: S,
    bus: B,
    clock: Arc<dyn Clock>,
}

pub type InMemoryLedger = SupplyChainLedger<
    Arc<InMemoryEventStore<DomainEvent>>,
    Arc<InMemoryEventBus<EventEnvelope<DomainEvent>>>,
>;

impl InMemoryLedger {
    /// Fresh ledger over an in-memory log and bus, stamped by the system clock.
    pub fn in_memory(config: LedgerConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryEventStore::new()),
            Arc::new(InMemoryEventBus::new()),
            Arc::new(SystemClock),
        )
    }
}

impl<S, B> SupplyChainLedger<S, B>
where
    S: EventStore<DomainEvent>,
    B: EventBus<EventEnvelope<DomainEvent>>,
{
    /// Ledger over an empty store. Use [`SupplyChainLedger::rehydrate`] for an existing log.
    pub fn new(config: LedgerConfig, store: S, bus: B, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            state: RwLock::new(LedgerState::new()),
            store,
            bus,
            clock,
        }
    }

    /// Rebuild the ledger by replaying every stored event in sequence order.
    ///
    /// Fails with `EventStoreError::Corrupt` if the log has gaps, does not start at 1, or
    /// carries ids that disagree with the state replayed so far.
    pub fn rehydrate(config: LedgerConfig, store: S, bus: B, clock: Arc<dyn Clock>) -> LedgerResult<Self> {
        let mut state = LedgerState::new();
        let end = store.last_sequence()?;

        for envelope in Tail::bounded(&store, 1, end) {
            let envelope = envelope?;
            state.check(&envelope)?;
            state.apply(&envelope);
        }

        info!(
            events = state.last_sequence(),
            products = state.products().len(),
            batches = state.batches().len(),
            "ledger rehydrated"
        );

        Ok(Self {
            config,
            state: RwLock::new(state),
            store,
            bus,
            clock,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ---- roles -------------------------------------------------------------------------

    /// Make `admin` the ledger admin (also holding MANUFACTURER and HANDLER) and record the
    /// configured thresholds.
    pub fn initialize(&self, admin: &Identity) -> LedgerResult<()> {
        self.commit("initialize", |state, at| {
            let mut events: Vec<DomainEvent> = state
                .roles()
                .initialize(admin, at)?
                .into_iter()
                .map(DomainEvent::from)
                .collect();
            events.extend(
                state
                    .alerts()
                    .establish(self.config.alerts, admin, at)?
                    .into_iter()
                    .map(DomainEvent::from),
            );
            Ok((events, ()))
        })?;

        info!(admin = %admin, "ledger initialized");
        Ok(())
    }

    pub fn grant_role(&self, role: Role, account: &Identity, caller: &Identity) -> LedgerResult<()> {
        self.commit("grant_role", |state, at| {
            let events = state.roles().grant(role, account, caller, at)?;
            Ok((events.into_iter().map(DomainEvent::from).collect(), ()))
        })?;

        info!(%role, account = %account, "role granted");
        Ok(())
    }

    pub fn revoke_role(&self, role: Role, account: &Identity, caller: &Identity) -> LedgerResult<()> {
        self.commit("revoke_role", |state, at| {
            let events = state.roles().revoke(role, account, caller, at)?;
            Ok((events.into_iter().map(DomainEvent::from).collect(), ()))
        })?;

        info!(%role, account = %account, "role revoked");
        Ok(())
    }

    pub fn has_role(&self, role: Role, identity: &Identity) -> LedgerResult<bool> {
        Ok(self.read_state()?.roles().has(role, identity))
    }

    // ---- products ----------------------------------------------------------------------

    pub fn create_product(&self, cmd: CreateProduct) -> LedgerResult<ProductId> {
        let product_id = self.commit("create_product", |state, at| {
            let products = state.products();
            let events = products.create(state.roles(), &self.config.qr_template, &cmd, at)?;
            Ok((events.into_iter().map(DomainEvent::from).collect(), products.next_id()))
        })?;

        info!(%product_id, manufacturer = %cmd.caller, "product created");
        Ok(product_id)
    }

    /// Record a custody update; an out-of-range temperature also commits a TemperatureAlert.
    pub fn update_product(&self, cmd: UpdateProduct) -> LedgerResult<UpdateReceipt> {
        let receipt = self.commit("update_product", |state, at| {
            let outcome = state
                .products()
                .record_update(state.roles(), state.alerts(), &cmd, at)?;

            let receipt = UpdateReceipt {
                product_id: outcome.updated.product_id,
                sequence_number: outcome.updated.sequence_number,
                alert: outcome.alert.clone(),
            };

            let mut events = vec![DomainEvent::ProductUpdated(outcome.updated)];
            events.extend(outcome.alert.map(DomainEvent::TemperatureAlert));
            Ok((events, receipt))
        })?;

        info!(
            product_id = %receipt.product_id,
            sequence_number = receipt.sequence_number,
            status = ?cmd.status,
            "product updated"
        );
        if let Some(alert) = &receipt.alert {
            warn!(
                product_id = %alert.product_id,
                temperature = %alert.temperature,
                breach = ?alert.breach,
                "temperature alert"
            );
        }
        Ok(receipt)
    }

    pub fn get_product(&self, id: ProductId) -> LedgerResult<Product> {
        Ok(self.read_state()?.products().get(id)?.clone())
    }

    pub fn get_update(&self, id: ProductId, sequence_number: u64) -> LedgerResult<Update> {
        Ok(self.read_state()?.products().update(id, sequence_number)?.clone())
    }

    pub fn product_history(&self, id: ProductId) -> LedgerResult<Vec<Update>> {
        Ok(self.read_state()?.products().history(id)?.to_vec())
    }

    pub fn list_products(&self) -> LedgerResult<Vec<Product>> {
        Ok(self.read_state()?.products().iter().cloned().collect())
    }

    // ---- batches -----------------------------------------------------------------------

    pub fn create_batch(&self, cmd: CreateBatch) -> LedgerResult<BatchId> {
        let batch_id = self.commit("create_batch", |state, at| {
            let batches = state.batches();
            let events = batches.create(
                state.roles(),
                state.products(),
                self.config.rebatch_policy,
                &cmd,
                at,
            )?;
            Ok((events.into_iter().map(DomainEvent::from).collect(), batches.next_id()))
        })?;

        info!(%batch_id, products = cmd.product_ids.len(), "batch created");
        Ok(batch_id)
    }

    pub fn get_batch(&self, id: BatchId) -> LedgerResult<Batch> {
        Ok(self.read_state()?.batches().get(id)?.clone())
    }

    pub fn list_batches(&self) -> LedgerResult<Vec<Batch>> {
        Ok(self.read_state()?.batches().iter().cloned().collect())
    }

    // ---- alerts ------------------------------------------------------------------------

    pub fn set_temperature_thresholds(
        &self,
        min_temperature: Temperature,
        max_temperature: Temperature,
        caller: &Identity,
    ) -> LedgerResult<()> {
        self.commit("set_temperature_thresholds", |state, at| {
            let events = state
                .alerts()
                .set_thresholds(state.roles(), min_temperature, max_temperature, caller, at)?;
            Ok((events.into_iter().map(DomainEvent::from).collect(), ()))
        })?;

        info!(min = %min_temperature, max = %max_temperature, "temperature thresholds changed");
        Ok(())
    }

    pub fn alert_config(&self) -> LedgerResult<AlertConfig> {
        Ok(self.read_state()?.alerts().config())
    }

    // ---- event log ---------------------------------------------------------------------

    pub fn last_sequence(&self) -> LedgerResult<u64> {
        Ok(self.read_state()?.last_sequence())
    }

    /// One page of the log starting at `from`.
    pub fn events(&self, from: u64, limit: usize) -> LedgerResult<Vec<EventEnvelope<DomainEvent>>> {
        Ok(self.store.read_from(from, limit)?)
    }

    /// Lazy replay from `from` up to the last event committed at call time.
    pub fn tail(&self, from: u64) -> LedgerResult<Tail<'_, S, DomainEvent>> {
        Ok(Tail::new(&self.store, from)?)
    }

    /// Push subscription receiving every envelope committed from now on.
    pub fn subscribe(&self) -> Subscription<EventEnvelope<DomainEvent>> {
        self.bus.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> LedgerResult<LedgerState> {
        Ok(self.read_state()?.clone())
    }

    // ---- pipeline ----------------------------------------------------------------------

    fn read_state(&self) -> LedgerResult<RwLockReadGuard<'_, LedgerState>> {
        self.state.read().map_err(|_| LedgerError::Poisoned)
    }

    fn write_state(&self) -> LedgerResult<RwLockWriteGuard<'_, LedgerState>> {
        self.state.write().map_err(|_| LedgerError::Poisoned)
    }

    fn commit<T>(
        &self,
        operation: &'static str,
        decide: impl FnOnce(&LedgerState, DateTime<Utc>) -> DomainResult<(Vec<DomainEvent>, T)>,
    ) -> LedgerResult<T> {
        let mut state = self.write_state()?;
        let at = state.commit_time(self.clock.now());

        let (events, output) = decide(&*state, at).inspect_err(|err| {
            debug!(operation, kind = err.kind(), error = %err, "operation rejected");
        })?;

        let committed = self
            .store
            .append(events, state.last_sequence())
            .inspect_err(|err| warn!(operation, error = %err, "event append failed"))?;

        for envelope in &committed {
            state.apply(envelope);
        }

        // Publish under the lock so subscribers see envelopes in sequence order.
        for envelope in committed {
            let sequence_number = envelope.sequence_number();
            if let Err(err) = self.bus.publish(envelope) {
                warn!(operation, sequence_number, error = ?err, "event publication failed");
            }
        }

        Ok(output)
    }
}
