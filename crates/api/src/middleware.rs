use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use chaintrack_core::Identity;

use crate::app::errors;
use crate::context::CallerContext;

/// Header carrying the caller identity, set by the upstream authentication layer.
pub const CALLER_HEADER: &str = "x-caller-identity";

pub async fn caller_middleware(mut req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let identity = match extract_caller(req.headers()) {
        Ok(identity) => identity,
        Err(message) => return errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", message),
    };

    req.extensions_mut().insert(CallerContext::new(identity));
    next.run(req).await
}

fn extract_caller(headers: &HeaderMap) -> Result<Identity, &'static str> {
    let header = headers
        .get(CALLER_HEADER)
        .ok_or("missing x-caller-identity header")?;

    let value = header
        .to_str()
        .map_err(|_| "x-caller-identity must be visible ASCII")?
        .trim();
    if value.is_empty() {
        return Err("x-caller-identity is blank");
    }

    Ok(Identity::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn caller_is_trimmed_and_required() {
        let mut headers = HeaderMap::new();
        assert!(extract_caller(&headers).is_err());

        headers.insert(CALLER_HEADER, HeaderValue::from_static("   "));
        assert!(extract_caller(&headers).is_err());

        headers.insert(CALLER_HEADER, HeaderValue::from_static(" 0xABC "));
        assert_eq!(extract_caller(&headers).unwrap(), Identity::new("0xABC"));
    }
}
