use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Event;

/// Envelope for a committed event.
///
/// This is the unit the event store persists and the bus fans out.
///
/// Notes:
/// - `sequence_number` is the position in the ledger-wide log: it starts at 1 and has no gaps.
/// - `recorded_at` is the commit timestamp shared by every event of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    sequence_number: u64,
    event_type: String,
    event_version: u32,
    recorded_at: DateTime<Utc>,
    payload: E,
}

impl<E> EventEnvelope<E> {
    /// Wrap a typed event, taking type/version/time from the event itself.
    pub fn seal(sequence_number: u64, payload: E) -> Self
    where
        E: Event,
    {
        Self {
            event_id: Uuid::now_v7(),
            sequence_number,
            event_type: payload.event_type().to_string(),
            event_version: payload.version(),
            recorded_at: payload.occurred_at(),
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> u32 {
        self.event_version
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
