use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use chaintrack_auth::Role;
use chaintrack_core::Identity;

use crate::app::{errors, services::AppServices};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new().route("/:role/:identity", post(grant).delete(revoke).get(check))
}

fn parse_role(raw: &str) -> Result<Role, axum::response::Response> {
    raw.parse::<Role>().map_err(errors::domain_error_to_response)
}

/// POST /roles/:role/:identity
pub async fn grant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((role, identity)): Path<(String, String)>,
) -> axum::response::Response {
    let role = match parse_role(&role) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let account = Identity::new(identity);

    match services.ledger.grant_role(role, &account, caller.identity()) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "role": role, "identity": account, "has_role": true })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// DELETE /roles/:role/:identity
pub async fn revoke(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((role, identity)): Path<(String, String)>,
) -> axum::response::Response {
    let role = match parse_role(&role) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let account = Identity::new(identity);

    match services.ledger.revoke_role(role, &account, caller.identity()) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "role": role, "identity": account, "has_role": false })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// GET /roles/:role/:identity
pub async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Path((role, identity)): Path<(String, String)>,
) -> axum::response::Response {
    let role = match parse_role(&role) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let account = Identity::new(identity);

    match services.ledger.has_role(role, &account) {
        Ok(has_role) => (
            StatusCode::OK,
            Json(serde_json::json!({ "role": role, "identity": account, "has_role": has_role })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
