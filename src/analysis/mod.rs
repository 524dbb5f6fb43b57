use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod prompt;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meals", get(handlers::list_meals))
        .route(
            "/meals/analyze",
            post(handlers::analyze_meal).layer(DefaultBodyLimit::max(20 * 1024 * 1024)),
        )
}
