use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes mounted at `/tools`.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/generate_character_profiles",
        post(generation::generate_character_profiles),
    )
}
