use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reflectly_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => ServerError::Validation(msg),
            StoreError::NotFound(what) => ServerError::NotFound(what.to_string()),
            StoreError::Conflict(msg) => ServerError::Conflict(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            ServerError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            ServerError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ServerError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::Validation("Content is required".into()), StatusCode::BAD_REQUEST),
            (StoreError::NotFound("Feedback"), StatusCode::NOT_FOUND),
            (StoreError::Conflict("taken".into()), StatusCode::CONFLICT),
            (StoreError::LockPoisoned, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let response = ServerError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
