//! Error types for the application

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid message: {0}")]
    InvalidMessage(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidMessage(e) => (StatusCode::BAD_REQUEST, format!("Invalid message: {}", e)),
            AppError::NotFound(e) => (StatusCode::NOT_FOUND, e.clone()),
        };

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("room lobby".to_string());
        assert_eq!(format!("{}", err), "Not found: room lobby");
    }

    #[test]
    fn test_invalid_message_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AppError = serde_err.into();
        assert!(matches!(err, AppError::InvalidMessage(_)));
        assert!(err.to_string().starts_with("Invalid message"));
    }

    #[test]
    fn test_not_found_into_response() {
        let err = AppError::NotFound("room".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_message_into_response() {
        let serde_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let response = AppError::from(serde_err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
