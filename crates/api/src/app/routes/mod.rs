use axum::Router;

pub mod alerts;
pub mod batches;
pub mod events;
pub mod products;
pub mod roles;
pub mod system;

/// Router for all endpoints that act on behalf of a caller.
pub fn router() -> Router {
    Router::new()
        .nest("/roles", roles::router())
        .nest("/products", products::router())
        .nest("/batches", batches::router())
        .nest("/alerts", alerts::router())
        .nest("/events", events::router())
}
