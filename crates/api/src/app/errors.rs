use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use chaintrack_core::DomainError;
use chaintrack_infra::LedgerError;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Domain(e) => domain_error_to_response(e),
        LedgerError::Store(e) => {
            tracing::error!(error = %e, "event store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
        LedgerError::Poisoned => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "ledger state unavailable",
        ),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::Unauthorized(_) => StatusCode::FORBIDDEN,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DomainError::AlreadyInitialized => StatusCode::CONFLICT,
    };
    json_error(status, err.kind(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn invalid_id(what: &str) -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        "invalid_id",
        format!("{what} id must be a positive integer"),
    )
}
