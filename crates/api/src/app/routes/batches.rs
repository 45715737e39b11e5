use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use chaintrack_batches::CreateBatch;
use chaintrack_core::{BatchId, ProductId};

use crate::app::{dto, errors, services::AppServices};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_batch).get(list_batches))
        .route("/:id", get(get_batch))
}

pub async fn create_batch(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::CreateBatchRequest>,
) -> axum::response::Response {
    let cmd = CreateBatch {
        product_ids: body.product_ids.into_iter().map(ProductId::new).collect(),
        caller: caller.into_identity(),
    };

    let id = match services.ledger.create_batch(cmd) {
        Ok(id) => id,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services.ledger.get_batch(id) {
        Ok(batch) => (StatusCode::CREATED, Json(dto::batch_to_json(batch))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_batch(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let batch_id: BatchId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("batch"),
    };
    match services.ledger.get_batch(batch_id) {
        Ok(batch) => (StatusCode::OK, Json(dto::batch_to_json(batch))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_batches(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.ledger.list_batches() {
        Ok(batches) => {
            let items = batches.into_iter().map(dto::batch_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}
