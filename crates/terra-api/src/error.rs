use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// API error taxonomy.
///
/// Domain failures (business rules, validation, store errors) surface their
/// message to the client with HTTP 400; authentication failures use 401;
/// everything unexpected is logged and collapsed to an opaque 500.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Domain(String),
    #[error("{0}")]
    Auth(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) | Self::Domain(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Database(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::Unexpected(err) => {
                tracing::error!("unexpected error: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_400() {
        let response = ApiError::Domain("Badge already earned".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::Validation("completionPercentage out of range".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_auth_errors_map_to_401() {
        let response = ApiError::Auth("Not authenticated".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_unexpected_errors_are_opaque_500() {
        let response =
            ApiError::Unexpected(anyhow::anyhow!("connection pool exploded")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
