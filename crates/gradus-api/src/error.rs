use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use gradus_service::ServiceError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },
    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::RateLimited { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded".to_owned())
            }
            ApiError::Service(err) => service_status(err),
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        if let ApiError::RateLimited { retry_after_secs } = self
            && let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

fn service_status(err: &ServiceError) -> (StatusCode, String) {
    match err {
        ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        ServiceError::Permission(_) => (StatusCode::FORBIDDEN, err.to_string()),
        ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::Conflict(_) => (StatusCode::CONFLICT, err.to_string()),
        ServiceError::Store(inner) => {
            // Storage details stay in the log, not in the response body.
            tracing::error!(error = %inner, "store failure while handling a request");
            (StatusCode::INTERNAL_SERVER_ERROR, "storage error".to_owned())
        }
    }
}
