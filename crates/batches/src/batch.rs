use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chaintrack_auth::{Role, RoleRegistry};
use chaintrack_core::{Aggregate, BatchId, DomainError, DomainResult, Identity, ProductId};
use chaintrack_events::Event;
use chaintrack_products::ProductLedger;

use crate::RebatchPolicy;

/// A group of products created in one operation. Membership never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    /// Listed in the order given at creation, duplicates included.
    pub product_ids: Vec<ProductId>,
    pub created_by: Identity,
    pub created_at: DateTime<Utc>,
}

/// Command: CreateBatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBatch {
    pub product_ids: Vec<ProductId>,
    pub caller: Identity,
}

/// Event: BatchCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCreated {
    pub batch_id: BatchId,
    pub product_ids: Vec<ProductId>,
    pub created_by: Identity,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchEvent {
    BatchCreated(BatchCreated),
}

impl Event for BatchEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BatchEvent::BatchCreated(_) => "batches.batch.created",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BatchEvent::BatchCreated(e) => e.occurred_at,
        }
    }
}

/// Aggregate: all batches, indexed by sequential id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchLedger {
    batches: Vec<Batch>,
    version: u64,
}

impl BatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn next_id(&self) -> BatchId {
        BatchId::new(self.batches.len() as u64 + 1)
    }

    pub fn get(&self, id: BatchId) -> DomainResult<&Batch> {
        id.index()
            .and_then(|idx| self.batches.get(idx))
            .ok_or_else(|| DomainError::not_found(format!("batch {id}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Batch> + '_ {
        self.batches.iter()
    }

    /// Decide a batch creation.
    ///
    /// Checks run in order: caller is a manufacturer, list is non-empty, every product
    /// exists, and (under [`RebatchPolicy::Reject`]) no product is already batched.
    pub fn create(
        &self,
        roles: &RoleRegistry,
        products: &ProductLedger,
        policy: RebatchPolicy,
        cmd: &CreateBatch,
        at: DateTime<Utc>,
    ) -> DomainResult<Vec<BatchEvent>> {
        roles.require(Role::Manufacturer, &cmd.caller)?;

        if cmd.product_ids.is_empty() {
            return Err(DomainError::invalid_input("batch must list at least one product"));
        }

        for id in &cmd.product_ids {
            let product = products.get(*id)?;
            if policy == RebatchPolicy::Reject {
                if let Some(existing) = product.batch_id {
                    return Err(DomainError::invalid_input(format!(
                        "product {id} already belongs to batch {existing}"
                    )));
                }
            }
        }

        Ok(vec![BatchEvent::BatchCreated(BatchCreated {
            batch_id: self.next_id(),
            product_ids: cmd.product_ids.clone(),
            created_by: cmd.caller.clone(),
            occurred_at: at,
        })])
    }
}

impl Aggregate for BatchLedger {
    type Event = BatchEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BatchEvent::BatchCreated(e) => {
                debug_assert_eq!(e.batch_id, self.next_id(), "batch ids are sequential");
                self.batches.push(Batch {
                    id: e.batch_id,
                    product_ids: e.product_ids.clone(),
                    created_by: e.created_by.clone(),
                    created_at: e.occurred_at,
                });
            }
        }

        self.version += 1;
    }

    fn version(&self) -> u64 {
        self.version
    }
}
