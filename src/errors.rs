use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("malformed upstream url: {0}")]
    MalformedUrl(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("upstream request timed out")]
    UpstreamTimeout,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Every failure renders as a 500 with a short plain-text diagnostic.
/// The hosting edge has no error page of its own to fall back on, so a
/// well-formed response must leave this process even when forwarding
/// breaks. Transport and internal detail goes to the log, not the caller.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let msg = match &self {
            AppError::MalformedUrl(e) => {
                format!("Worker Error: {}", e)
            }
            AppError::Upstream(e) => {
                tracing::error!("upstream failure: {}", e);
                "Worker Error: failed to forward request to origin".to_string()
            }
            AppError::UpstreamTimeout => {
                tracing::error!("upstream timed out");
                "Worker Error: origin did not respond in time".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {}", e);
                "Worker Error: internal error".to_string()
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
    }
}
