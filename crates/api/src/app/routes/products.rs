use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use chaintrack_alerts::Temperature;
use chaintrack_core::ProductId;
use chaintrack_products::{CreateProduct, UpdateProduct};

use crate::app::{dto, errors, services::AppServices};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product))
        .route("/:id/updates", post(update_product).get(product_history))
        .route("/:id/updates/:seq", get(get_update))
}

fn parse_product_id(raw: &str) -> Result<ProductId, axum::response::Response> {
    raw.parse::<ProductId>().map_err(|_| errors::invalid_id("product"))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let cmd = CreateProduct {
        name: body.name,
        description: body.description,
        caller: caller.into_identity(),
    };

    let id = match services.ledger.create_product(cmd) {
        Ok(id) => id,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services.ledger.get_product(id) {
        Ok(product) => (StatusCode::CREATED, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status = match body.status.resolve() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let cmd = UpdateProduct {
        product_id,
        location: body.location,
        notes: body.notes,
        status,
        temperature: Temperature::from_centi(body.temperature),
        caller: caller.into_identity(),
    };

    match services.ledger.update_product(cmd) {
        Ok(receipt) => (StatusCode::CREATED, Json(dto::receipt_to_json(receipt))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.ledger.get_product(product_id) {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.ledger.list_products() {
        Ok(products) => {
            let items = products.into_iter().map(dto::product_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn product_history(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.ledger.product_history(product_id) {
        Ok(updates) => {
            let items = updates.into_iter().map(dto::update_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_update(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, seq)): Path<(String, String)>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Ok(sequence_number) = seq.parse::<u64>() else {
        return errors::invalid_id("update");
    };
    match services.ledger.get_update(product_id, sequence_number) {
        Ok(update) => (StatusCode::OK, Json(dto::update_to_json(update))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
