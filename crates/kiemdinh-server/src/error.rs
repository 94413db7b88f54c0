use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kiemdinh_core::error::KiemdinhError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`KiemdinhError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `kiemdinh_core`.
    #[error(transparent)]
    Core(#[from] KiemdinhError),

    /// Malformed or mistyped request body.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Invalid server configuration at start-up.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Socket bind or serve failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                KiemdinhError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                KiemdinhError::OutOfRange(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", core.to_string())
                }
                KiemdinhError::NoSamplingPlan(_) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", core.to_string())
                }
                other => {
                    tracing::error!(error = %other, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Config(_) | AppError::Io(_) => {
                tracing::error!(error = %self, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
