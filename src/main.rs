use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderName, Method, header},
};
use sharelink::{
    config::AppConfig,
    routes,
    services::{
        key_service::KeyGenerator,
        link_service::LinkResolver,
        object_store::{self, S3Store},
        share_service::ShareService,
    },
};
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeFile,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;
    tracing::info!(
        addr = %cfg.addr(),
        endpoint = %cfg.s3_endpoint,
        bucket = %cfg.s3_bucket,
        prefix = %cfg.key_prefix,
        "starting sharelink gateway"
    );

    // --- Connect the backend and provision the bucket ---
    let store = S3Store::connect(&cfg).context("connecting to the object-store backend")?;
    object_store::ensure_bucket(&store)
        .await
        .context("provisioning the storage bucket")?;

    // --- Initialize core service ---
    let service = ShareService::new(
        Arc::new(store),
        KeyGenerator::new(),
        LinkResolver::new(cfg.base_link.clone(), cfg.key_prefix.clone()),
    );

    // --- Build router ---
    let app: Router = routes::routes::routes()
        .with_state(service)
        .route_service("/", ServeFile::new("public/index.html"))
        .route_service("/share", ServeFile::new("public/share.html"))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http());

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS for the browser upload pages: mirror the caller's origin, allow
/// credentials, and accept the headers the pages send alongside uploads.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_LENGTH,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-screen-height"),
            HeaderName::from_static("x-screen-width"),
        ])
}
