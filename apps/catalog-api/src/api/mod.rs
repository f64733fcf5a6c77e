mod catalog;
mod health;

use axum::Router;

use crate::state::AppState;

pub use health::ready_router;

/// Builds the `/api` route tree.
pub fn routes(state: &AppState) -> Router {
    catalog::router(state)
}
