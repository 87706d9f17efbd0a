//! Maps failures onto HTTP responses.
//!
//! Every error renders as `{"error": "<message>"}`:
//! - invalid input (bad count, bad ID) is a `400`
//! - a clock regression is a `503` with `Retry-After: 1`, since the condition
//!   clears once the clock catches up
//! - anything else is a `500`

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub type Result<T> = core::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The generator refused the request.
    #[error(transparent)]
    Id(#[from] chirpid::Error),

    /// A path segment could not be read.
    #[error("{reason}")]
    BadRequest { reason: String },

    #[error("{context}")]
    Internal { context: String },
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Id(chirpid::Error::InvalidArgument { .. }) | Self::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Id(chirpid::Error::ClockRegression { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Id(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }

        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        if status == StatusCode::SERVICE_UNAVAILABLE {
            (status, [(header::RETRY_AFTER, "1")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
