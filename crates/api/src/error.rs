use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cast_core::error::CoreError;
use cast_core::result::{GenerationResult, ERROR_INTERNAL, ERROR_VALIDATION};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for pipeline errors and adds HTTP-specific variants.
/// Every response body has the shape of a failed [`GenerationResult`], so
/// callers parse one schema regardless of status code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An error propagated from the generation pipeline.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request body could not be decoded.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(CoreError::Validation(msg)) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ERROR_VALIDATION, msg.clone())
            }
            AppError::Core(core @ (CoreError::Capacity(_) | CoreError::Internal(_))) => {
                tracing::error!(error = %core, "Internal generation error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ERROR_INTERNAL,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, axum::Json(GenerationResult::failure(code, message))).into_response()
    }
}
