//! HTTP Module
//!
//! The outward-facing API: `PUT`, `GET`, and `DELETE` on `/v1/{key}`.
//!
//! ## Responsibilities
//! - Route requests to the service
//! - Map service errors to the API's status codes
//! - Keep blocking log submission off the async runtime

mod handlers;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::service::KeyValueService;
use crate::store::MemoryStore;

/// Service handle shared across requests
pub type SharedService = Arc<KeyValueService<MemoryStore>>;

/// Build the application router
pub fn router(service: SharedService) -> Router {
    Router::new()
        .route(
            "/v1/{key}",
            get(handlers::get_value)
                .put(handlers::put_value)
                .delete(handlers::delete_value),
        )
        .with_state(service)
}
