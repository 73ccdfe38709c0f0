use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the persistence and execution-state layer.
///
/// Raw driver errors never escape this layer: every database failure is
/// caught at the operation boundary, rolled back, and translated into one
/// of these kinds.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection parameters unresolvable. Fatal at startup, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failed to open a database connection. Write paths may retry with
    /// a bounded policy; read paths surface this immediately.
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// Required tables could not be verified or created. The enclosing
    /// operation aborts without committing.
    #[error("schema verification failed: {0}")]
    Schema(String),

    /// Malformed input, rejected before any I/O.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Referenced job or artifact does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other persistence failure, surfaced after rollback.
    #[error("storage failure: {0}")]
    Store(#[source] sqlx::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Configuration(_) | Error::Schema(_) | Error::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
