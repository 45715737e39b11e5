use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chaintrack_alerts::{AlertPolicy, TemperatureAlert, Temperature};
use chaintrack_auth::{Role, RoleRegistry};
use chaintrack_core::{Aggregate, BatchId, DomainError, DomainResult, Identity, ProductId};
use chaintrack_events::Event;

use crate::QrCodeTemplate;

/// Custody status of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Created,
    InTransit,
    InStorage,
    Delivered,
}

impl ProductStatus {
    /// Numeric status code (0..=3) accepted by status-code clients.
    pub fn code(self) -> u8 {
        match self {
            ProductStatus::Created => 0,
            ProductStatus::InTransit => 1,
            ProductStatus::InStorage => 2,
            ProductStatus::Delivered => 3,
        }
    }

    pub fn from_code(code: u8) -> DomainResult<Self> {
        match code {
            0 => Ok(ProductStatus::Created),
            1 => Ok(ProductStatus::InTransit),
            2 => Ok(ProductStatus::InStorage),
            3 => Ok(ProductStatus::Delivered),
            other => Err(DomainError::invalid_input(format!("unknown product status code {other}"))),
        }
    }
}

/// Latest snapshot of a tracked product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub manufacturer: Identity,
    pub status: ProductStatus,
    pub location: String,
    pub temperature: Temperature,
    pub batch_id: Option<BatchId>,
    pub qr_code: String,
    pub created_at: DateTime<Utc>,
    pub update_count: u64,
}

/// Immutable audit record of one product update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub sequence_number: u64,
    pub handler: Identity,
    pub location: String,
    pub notes: String,
    pub status: ProductStatus,
    pub temperature: Temperature,
    pub timestamp: DateTime<Utc>,
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub caller: Identity,
}

/// Command: UpdateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub product_id: ProductId,
    pub location: String,
    pub notes: String,
    pub status: ProductStatus,
    pub temperature: Temperature,
    pub caller: Identity,
}

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub manufacturer: Identity,
    pub qr_code: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub product_id: ProductId,
    pub sequence_number: u64,
    pub handler: Identity,
    pub location: String,
    pub notes: String,
    pub status: ProductStatus,
    pub temperature: Temperature,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    ProductUpdated(ProductUpdated),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "products.product.created",
            ProductEvent::ProductUpdated(_) => "products.product.updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.occurred_at,
            ProductEvent::ProductUpdated(e) => e.occurred_at,
        }
    }
}

/// Decision for one update: the update itself plus the alert it triggers, if any.
///
/// Both halves must be committed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub updated: ProductUpdated,
    pub alert: Option<TemperatureAlert>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProductRecord {
    product: Product,
    updates: Vec<Update>,
}

/// Aggregate: arena of products keyed by sequential id, each with its update history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductLedger {
    records: Vec<ProductRecord>,
    version: u64,
}

impl ProductLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Id the next successful creation will receive.
    pub fn next_id(&self) -> ProductId {
        ProductId::new(self.records.len() as u64 + 1)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.record(id).is_some()
    }

    pub fn get(&self, id: ProductId) -> DomainResult<&Product> {
        self.record(id)
            .map(|r| &r.product)
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))
    }

    pub fn update(&self, id: ProductId, sequence_number: u64) -> DomainResult<&Update> {
        let history = self.history(id)?;
        sequence_number
            .checked_sub(1)
            .and_then(|idx| usize::try_from(idx).ok())
            .and_then(|idx| history.get(idx))
            .ok_or_else(|| DomainError::not_found(format!("update {sequence_number} of product {id}")))
    }

    /// Full update history of a product, oldest first.
    pub fn history(&self, id: ProductId) -> DomainResult<&[Update]> {
        self.record(id)
            .map(|r| r.updates.as_slice())
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> + '_ {
        self.records.iter().map(|r| &r.product)
    }

    pub fn create(
        &self,
        roles: &RoleRegistry,
        qr: &QrCodeTemplate,
        cmd: &CreateProduct,
        at: DateTime<Utc>,
    ) -> DomainResult<Vec<ProductEvent>> {
        roles.require(Role::Manufacturer, &cmd.caller)?;

        if cmd.name.trim().is_empty() {
            return Err(DomainError::invalid_input("name cannot be empty"));
        }
        if cmd.description.trim().is_empty() {
            return Err(DomainError::invalid_input("description cannot be empty"));
        }

        let product_id = self.next_id();
        Ok(vec![ProductEvent::ProductCreated(ProductCreated {
            product_id,
            name: cmd.name.clone(),
            description: cmd.description.clone(),
            manufacturer: cmd.caller.clone(),
            qr_code: qr.render(product_id),
            occurred_at: at,
        })])
    }

    /// Decide an update. The temperature is evaluated against `alerts` as part of the
    /// same decision.
    pub fn record_update(
        &self,
        roles: &RoleRegistry,
        alerts: &AlertPolicy,
        cmd: &UpdateProduct,
        at: DateTime<Utc>,
    ) -> DomainResult<UpdateOutcome> {
        let history = self.history(cmd.product_id)?;
        roles.require(Role::Handler, &cmd.caller)?;

        let updated = ProductUpdated {
            product_id: cmd.product_id,
            sequence_number: history.len() as u64 + 1,
            handler: cmd.caller.clone(),
            location: cmd.location.clone(),
            notes: cmd.notes.clone(),
            status: cmd.status,
            temperature: cmd.temperature,
            occurred_at: at,
        };
        let alert = alerts.evaluate(cmd.product_id, cmd.temperature, at);

        Ok(UpdateOutcome { updated, alert })
    }

    /// Stamp batch membership onto products (evolution step for a committed batch).
    ///
    /// Unknown ids are skipped; batch creation has already checked existence.
    pub fn assign_batch(&mut self, batch_id: BatchId, product_ids: &[ProductId]) {
        for id in product_ids {
            if let Some(record) = self.record_mut(*id) {
                record.product.batch_id = Some(batch_id);
            }
        }
    }

    fn record(&self, id: ProductId) -> Option<&ProductRecord> {
        self.records.get(id.index()?)
    }

    fn record_mut(&mut self, id: ProductId) -> Option<&mut ProductRecord> {
        self.records.get_mut(id.index()?)
    }
}

impl Aggregate for ProductLedger {
    type Event = ProductEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductCreated(e) => {
                debug_assert_eq!(e.product_id, self.next_id(), "product ids are sequential");
                self.records.push(ProductRecord {
                    product: Product {
                        id: e.product_id,
                        name: e.name.clone(),
                        description: e.description.clone(),
                        manufacturer: e.manufacturer.clone(),
                        status: ProductStatus::Created,
                        location: String::new(),
                        temperature: Temperature::ZERO,
                        batch_id: None,
                        qr_code: e.qr_code.clone(),
                        created_at: e.occurred_at,
                        update_count: 0,
                    },
                    updates: Vec::new(),
                });
            }
            ProductEvent::ProductUpdated(e) => {
                if let Some(record) = self.record_mut(e.product_id) {
                    record.product.location = e.location.clone();
                    record.product.status = e.status;
                    record.product.temperature = e.temperature;
                    record.product.update_count = e.sequence_number;
                    record.updates.push(Update {
                        sequence_number: e.sequence_number,
                        handler: e.handler.clone(),
                        location: e.location.clone(),
                        notes: e.notes.clone(),
                        status: e.status,
                        temperature: e.temperature,
                        timestamp: e.occurred_at,
                    });
                }
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn version(&self) -> u64 {
        self.version
    }
}
