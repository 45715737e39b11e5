use serde::Deserialize;

use chaintrack_alerts::AlertConfig;
use chaintrack_batches::Batch;
use chaintrack_core::DomainResult;
use chaintrack_events::EventEnvelope;
use chaintrack_infra::{DomainEvent, UpdateReceipt};
use chaintrack_products::{Product, ProductStatus, Update};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
}

/// Status as either its name (`"IN_TRANSIT"`) or its numeric code (`1`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StatusInput {
    Code(u8),
    Name(ProductStatus),
}

impl StatusInput {
    pub fn resolve(self) -> DomainResult<ProductStatus> {
        match self {
            StatusInput::Code(code) => ProductStatus::from_code(code),
            StatusInput::Name(status) => Ok(status),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub location: String,
    #[serde(default)]
    pub notes: String,
    pub status: StatusInput,
    /// Hundredths of a degree.
    pub temperature: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    pub product_ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SetThresholdsRequest {
    pub min_temperature: i64,
    pub max_temperature: i64,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub from: Option<u64>,
    pub limit: Option<usize>,
}

impl EventsQuery {
    pub const DEFAULT_LIMIT: usize = 100;
    pub const MAX_LIMIT: usize = 1000;

    pub fn start(&self) -> u64 {
        self.from.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).min(Self::MAX_LIMIT)
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(p: Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id,
        "name": p.name,
        "description": p.description,
        "manufacturer": p.manufacturer,
        "status": p.status,
        "status_code": p.status.code(),
        "location": p.location,
        "temperature": p.temperature,
        "batch_id": p.batch_id,
        "qr_code": p.qr_code,
        "created_at": p.created_at,
        "update_count": p.update_count,
    })
}

pub fn update_to_json(u: Update) -> serde_json::Value {
    serde_json::json!({
        "sequence_number": u.sequence_number,
        "handler": u.handler,
        "location": u.location,
        "notes": u.notes,
        "status": u.status,
        "status_code": u.status.code(),
        "temperature": u.temperature,
        "timestamp": u.timestamp,
    })
}

pub fn receipt_to_json(r: UpdateReceipt) -> serde_json::Value {
    serde_json::json!({
        "product_id": r.product_id,
        "sequence_number": r.sequence_number,
        "alert": r.alert,
    })
}

pub fn batch_to_json(b: Batch) -> serde_json::Value {
    serde_json::json!({
        "id": b.id,
        "product_ids": b.product_ids,
        "created_by": b.created_by,
        "created_at": b.created_at,
    })
}

pub fn thresholds_to_json(c: AlertConfig) -> serde_json::Value {
    serde_json::json!({
        "min_temperature": c.min_temperature,
        "max_temperature": c.max_temperature,
    })
}

pub fn envelope_to_json(e: EventEnvelope<DomainEvent>) -> serde_json::Value {
    serde_json::json!({
        "event_id": e.event_id().to_string(),
        "sequence_number": e.sequence_number(),
        "event_type": e.event_type(),
        "event_version": e.event_version(),
        "recorded_at": e.recorded_at(),
        "payload": e.payload(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_name_or_code() {
        let by_name: UpdateProductRequest = serde_json::from_value(serde_json::json!({
            "location": "Dock", "status": "IN_STORAGE", "temperature": 1800
        }))
        .unwrap();
        assert_eq!(by_name.status.resolve().unwrap(), ProductStatus::InStorage);
        assert_eq!(by_name.notes, "");

        let by_code: UpdateProductRequest = serde_json::from_value(serde_json::json!({
            "location": "Dock", "notes": "n", "status": 3, "temperature": 1800
        }))
        .unwrap();
        assert_eq!(by_code.status.resolve().unwrap(), ProductStatus::Delivered);

        let bad: UpdateProductRequest = serde_json::from_value(serde_json::json!({
            "location": "Dock", "status": 9, "temperature": 1800
        }))
        .unwrap();
        assert!(bad.status.resolve().is_err());
    }

    #[test]
    fn events_query_is_clamped() {
        let q = EventsQuery { from: Some(0), limit: Some(50_000) };
        assert_eq!(q.start(), 1);
        assert_eq!(q.limit(), EventsQuery::MAX_LIMIT);

        let q = EventsQuery { from: None, limit: None };
        assert_eq!(q.limit(), EventsQuery::DEFAULT_LIMIT);
    }
}
