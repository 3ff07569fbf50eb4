//! HTTP server setup, routing, and graceful shutdown

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, SystemTime},
};
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, instrument};

use crate::{
    config::{parse_size_string, SystemConfig},
    deploy::DeployPipeline,
    http::handlers::*,
    types::Result,
};

const FALLBACK_UPLOAD_LIMIT: usize = 100 * 1024 * 1024; // 100MB

/// Start the HTTP server with the given configuration
#[instrument(skip_all)]
pub async fn start_server(
    config: SystemConfig,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app_state = Arc::new(AppState {
        pipeline: DeployPipeline::new(&config),
        config: config.clone(),
        start_time: SystemTime::now(),
    });

    let router = create_router(app_state, &config);
    let addr = parse_listen_address(&config.server.listen)?;

    info!(
        listen_addr = %addr,
        max_upload_size = %config.server.max_upload_size,
        request_timeout = config.server.request_timeout,
        "Starting HTTP server"
    );

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        error!(error = %e, addr = %addr, "Failed to bind to address");
        crate::types::Error::Io(e)
    })?;

    info!(
        local_addr = %listener.local_addr().unwrap_or(addr),
        "HTTP server listening"
    );

    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        shutdown_signal.await;
        info!("Shutdown signal received, starting graceful shutdown");
    });

    if let Err(e) = server.await {
        error!(error = %e, "HTTP server error");
        return Err(crate::types::Error::Io(e));
    }

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Create the Axum router with all endpoints and middleware
pub fn create_router(app_state: Arc<AppState>, config: &SystemConfig) -> Router {
    let upload_limit = parse_size_string(&config.server.max_upload_size)
        .ok()
        .and_then(|bytes| usize::try_from(bytes).ok())
        .unwrap_or(FALLBACK_UPLOAD_LIMIT);

    let mut router = Router::new()
        .route("/deploy/package", post(handle_deploy_package))
        .route(&config.monitoring.health_path, get(handle_health));

    if config.monitoring.metrics_enabled {
        router = router.route(&config.monitoring.metrics_path, get(handle_metrics));
    }

    router
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout,
        )))
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(RequestBodyLimitLayer::new(upload_limit))
        .with_state(app_state)
}

/// Parse the listen address from configuration
fn parse_listen_address(listen: &str) -> Result<SocketAddr> {
    listen.parse().map_err(|e| {
        error!(
            listen_addr = %listen,
            error = %e,
            "Invalid listen address format"
        );
        crate::types::Error::Config(crate::types::ConfigError::Invalid {
            message: format!("Invalid listen address '{}': {}", listen, e),
        })
    })
}
