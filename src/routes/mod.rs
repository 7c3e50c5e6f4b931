//! Router assembly.

mod common;
mod entity;
pub use common::common_routes;
pub use entity::{api_routes, entity_routes, MAX_BODY_BYTES};

use crate::state::AppState;
use axum::Router;

/// Full application router: operational endpoints plus the entity API.
pub fn app(state: AppState) -> Router {
    common_routes(state.clone()).merge(api_routes(state))
}
