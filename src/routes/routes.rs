//! Defines routes for the gateway API.
//!
//! ## Structure
//! - **API endpoints**
//!   - `POST /api/upload` — multipart upload, `?sharing=true` for a full link
//!   - `GET  /api/link/{key}` — resolve a key (`?ios` / `?stream` redirect)
//!
//! - **Probes**
//!   - `GET /healthz` — liveness
//!   - `GET /readyz`  — readiness against the storage backend
//!
//! The static pages (`/`, `/share`) are mounted in `main` next to the
//! middleware stack.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        share_handlers::{get_links, upload_file},
    },
    services::share_service::ShareService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Build and return the router for the gateway routes.
///
/// The router carries shared state (`ShareService`) to all handlers. The
/// default body limit is disabled: upload size is unbounded and the backend
/// determines length from the stream itself.
pub fn routes() -> Router<ShareService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // gateway API
        .route("/api/upload", post(upload_file))
        .route("/api/link/{key}", get(get_links))
        .layer(DefaultBodyLimit::disable())
}
