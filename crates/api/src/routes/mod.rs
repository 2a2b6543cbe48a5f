pub mod tools;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /tools/generate_character_profiles   POST  generate profiles for a scene list
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/tools", tools::router())
}
