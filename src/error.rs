use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ConnectionId;

/// Unified error type for the Pulseboard application
#[derive(Error, Debug)]
pub enum DashboardError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Broadcast errors
    #[error("Unknown connection: {0}")]
    UnknownConnection(ConnectionId),

    // Wire errors
    #[error("Invalid client message: {0}")]
    InvalidMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Pulseboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            DashboardError::InvalidMessage(_) | DashboardError::InvalidConfig(_) => {
                StatusCode::BAD_REQUEST
            }

            // 404 Not Found
            DashboardError::UnknownConnection(_) => StatusCode::NOT_FOUND,

            // 502 Bad Gateway
            DashboardError::Transport(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            DashboardError::Serialization(_)
            | DashboardError::Io(_)
            | DashboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_status_code_mapping() {
        assert_eq!(
            DashboardError::InvalidMessage("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DashboardError::InvalidConfig("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DashboardError::UnknownConnection(ConnectionId::from(Uuid::nil())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DashboardError::Transport("reset".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            DashboardError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_client_server_helpers() {
        assert!(DashboardError::InvalidMessage("bad".to_string()).is_client_error());
        assert!(!DashboardError::InvalidMessage("bad".to_string()).is_server_error());

        assert!(DashboardError::Internal("boom".to_string()).is_server_error());
        assert!(!DashboardError::Internal("boom".to_string()).is_client_error());
    }

    #[tokio::test]
    async fn test_error_into_response() {
        use http_body_util::BodyExt;

        let response = DashboardError::InvalidMessage("bad frame".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Invalid client message: bad frame");
    }

    #[test]
    fn test_serde_error_converts() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DashboardError = err.into();
        assert!(matches!(err, DashboardError::Serialization(_)));
    }
}
