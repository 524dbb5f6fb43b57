use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", post(handlers::generate_plan))
        .route("/plans/latest", get(handlers::latest_plan))
}
