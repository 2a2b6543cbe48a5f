//! Handler for the `generate_character_profiles` tool.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use cast_core::result::GenerationResult;
use cast_core::scene::GenerateRequest;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/tools/generate_character_profiles
///
/// Business outcomes, including `lacking_guidance`, are returned with 200;
/// only validation and internal failures map to error statuses.
pub async fn generate_character_profiles(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<GenerationResult>> {
    let Json(request) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let result = state.generator.generate(&request).await?;
    Ok(Json(result))
}
