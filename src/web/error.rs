use crate::error::Error;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

/// Error returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Service(Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Service(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Service(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Service(Error::ModelNotFound { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::NotFound(what) => json!({ "error": format!("{what} not found") }),
            ApiError::Service(e @ Error::MissingFields(fields)) => {
                json!({ "error": e.to_string(), "missing": fields })
            }
            ApiError::Service(e) => json!({ "error": e.to_string() }),
        };

        if status.is_server_error() {
            error!(status = %status, error = ?self, "Request failed");
        } else {
            warn!(status = %status, error = ?self, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}
