use axum::Router;
use axum::routing::get;

use crate::AppState;
use crate::handlers::{health, index};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .with_state(state)
}
