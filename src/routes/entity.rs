//! Entity CRUD routes. Parameterized paths so one handler set serves every
//! collection; handlers resolve the entity by path segment.

use crate::handlers::entity::{create, delete as delete_handler, list, partial_update, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

/// Upper bound for entity request bodies.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Routes relative to the API prefix; see [`api_routes`].
pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/:resource", get(list).post(create))
        .route(
            "/:resource/:id",
            get(read).put(update).patch(partial_update).delete(delete_handler),
        )
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)))
        .with_state(state)
}

/// Entity routes mounted under `/api`.
pub fn api_routes(state: AppState) -> Router {
    Router::new().nest("/api", entity_routes(state))
}
