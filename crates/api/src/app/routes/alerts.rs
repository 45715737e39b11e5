use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use chaintrack_alerts::Temperature;

use crate::app::{dto, errors, services::AppServices};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new().route("/thresholds", get(get_thresholds).put(set_thresholds))
}

pub async fn get_thresholds(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.ledger.alert_config() {
        Ok(config) => (StatusCode::OK, Json(dto::thresholds_to_json(config))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn set_thresholds(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::SetThresholdsRequest>,
) -> axum::response::Response {
    let result = services.ledger.set_temperature_thresholds(
        Temperature::from_centi(body.min_temperature),
        Temperature::from_centi(body.max_temperature),
        caller.identity(),
    );
    if let Err(e) = result {
        return errors::ledger_error_to_response(e);
    }

    get_thresholds(Extension(services)).await
}
