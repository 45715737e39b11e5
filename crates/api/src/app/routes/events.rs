//! Read-only access to the ordered event log.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new().route("/", get(list_events))
}

/// GET /events?from=1&limit=100
///
/// One page of the log in sequence order. `next_from` is where the following page starts.
pub async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::EventsQuery>,
) -> axum::response::Response {
    let from = query.start();
    let page = match services.ledger.events(from, query.limit()) {
        Ok(page) => page,
        Err(e) => return errors::ledger_error_to_response(e),
    };
    let last_sequence = match services.ledger.last_sequence() {
        Ok(seq) => seq,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    let next_from = page.last().map(|e| e.sequence_number() + 1).unwrap_or(from);
    let events = page.into_iter().map(dto::envelope_to_json).collect::<Vec<_>>();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "events": events,
            "next_from": next_from,
            "last_sequence": last_sequence,
        })),
    )
        .into_response()
}
