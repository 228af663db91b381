//! HTTP handlers
//!
//! Thin adapters between requests and the service. Mutations run on
//! the blocking pool because log submission can park the caller on a
//! full writer queue.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use bytes::Bytes;
use tracing::error;

use crate::error::LedgerError;

use super::SharedService;

/// `PUT /v1/{key}`: store the request body as the key's value
pub async fn put_value(
    State(service): State<SharedService>,
    Path(key): Path<String>,
    body: Bytes,
) -> (StatusCode, String) {
    let value = match String::from_utf8(body.to_vec()) {
        Ok(v) => v,
        Err(_) => {
            return error_response(LedgerError::InvalidValue(
                "value is not valid UTF-8".to_string(),
            ))
        }
    };

    match run_blocking(move || service.put(&key, &value)).await {
        Ok(()) => (StatusCode::CREATED, String::new()),
        Err(e) => error_response(e),
    }
}

/// `GET /v1/{key}`: return the key's current value
pub async fn get_value(
    State(service): State<SharedService>,
    Path(key): Path<String>,
) -> (StatusCode, String) {
    // Reads never block on the writer queue, so no pool hop.
    match service.get(&key) {
        Ok(value) => (StatusCode::OK, value),
        Err(e) => error_response(e),
    }
}

/// `DELETE /v1/{key}`: remove the key
pub async fn delete_value(
    State(service): State<SharedService>,
    Path(key): Path<String>,
) -> (StatusCode, String) {
    match run_blocking(move || service.delete(&key)).await {
        Ok(()) => (StatusCode::OK, String::new()),
        Err(e) => error_response(e),
    }
}

async fn run_blocking<F>(task: F) -> crate::error::Result<()>
where
    F: FnOnce() -> crate::error::Result<()> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "blocking task failed");
            Err(LedgerError::WriterPanicked)
        }
    }
}

/// Map a service error to a status code and plain-text body
fn error_response(err: LedgerError) -> (StatusCode, String) {
    let status = match &err {
        LedgerError::KeyNotFound => StatusCode::NOT_FOUND,
        LedgerError::InvalidKey(_) | LedgerError::InvalidValue(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "request failed");
    }

    (status, format!("{}\n", err))
}
