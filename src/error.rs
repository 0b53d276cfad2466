use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Outcomes of a store operation that are not plain success.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order not found")]
    NotFound,
    #[error("order id already exists")]
    Conflict,
    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Translates a store outcome into an API error. Database failures are
    /// logged with full detail and reported to the caller as the generic
    /// per-operation message only.
    pub fn api(self, context: &str) -> ApiError {
        match self {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Conflict => ApiError::Conflict,
            StoreError::Database(detail) => {
                tracing::error!("{}: {}", context, detail);
                ApiError::Server(context.to_string())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Order ID already exists")]
    Conflict,
    #[error("Order not found")]
    NotFound,
    #[error("{0}")]
    Server(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) | ApiError::Conflict => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_api_taxonomy() {
        assert!(matches!(
            StoreError::NotFound.api("Failed to fetch order"),
            ApiError::NotFound
        ));
        assert!(matches!(
            StoreError::Conflict.api("Failed to add order"),
            ApiError::Conflict
        ));
        match StoreError::Database("connection refused".to_string()).api("Failed to fetch orders") {
            ApiError::Server(message) => assert_eq!(message, "Failed to fetch orders"),
            other => panic!("unexpected mapping: {:?}", other),
        }
    }
}
