/// Server error types
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use loopcast_stream::StreamError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The stream cannot be served right now (no tracks, no encoder)
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServerError::Unavailable(msg) => {
                // Plain text so audio players show the reason verbatim
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    msg,
                )
                    .into_response();
            }
            ServerError::Stream(
                ref e @ (StreamError::EmptyCatalog | StreamError::EncoderUnavailable { .. }),
            ) => {
                tracing::warn!("Stream unavailable: {}", e);
                return ServerError::Unavailable(e.to_string()).into_response();
            }
            ServerError::Stream(ref e) => {
                tracing::error!("Stream error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Stream error".to_string(),
                )
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
