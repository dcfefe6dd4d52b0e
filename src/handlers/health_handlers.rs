//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks the storage backend

use crate::services::share_service::ShareService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that asks the backend whether the configured bucket is
/// reachable and provisioned. Returns JSON describing the check. HTTP 200
/// when it passes, HTTP 503 when it fails. Backend failures are logged here;
/// the response body never carries endpoint or credential detail.
pub async fn readyz(State(service): State<ShareService>) -> impl IntoResponse {
    let backend_check = match service.store.bucket_exists().await {
        Ok(true) => (true, None::<String>),
        Ok(false) => (false, Some("bucket not provisioned".to_string())),
        Err(err) => {
            tracing::warn!("readiness probe failed: {err}");
            (false, Some("backend unreachable".to_string()))
        }
    };

    let backend_ok = backend_check.0;

    let mut checks = HashMap::new();
    checks.insert(
        "backend",
        CheckStatus {
            ok: backend_ok,
            error: backend_check.1,
        },
    );

    let body = ReadyResponse {
        status: if backend_ok {
            "ok".into()
        } else {
            "error".into()
        },
        checks,
    };

    let status = if backend_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
