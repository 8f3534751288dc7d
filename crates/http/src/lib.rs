//! HTTP server facade: router assembly, error envelope, health and OpenAPI.

use std::sync::Arc;

use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Map, Value};
use tokio::signal;

use lms_kernel::settings::ServerSettings;
use lms_kernel::ModuleRegistry;

pub mod error;
pub mod router;

pub use error::AppError;
pub use router::{openapi_document, RouterBuilder};

/// Serve the registry's modules until SIGINT or SIGTERM.
pub async fn start_server(
    registry: Arc<ModuleRegistry>,
    settings: &ServerSettings,
) -> anyhow::Result<()> {
    let app = build_router(registry, settings);

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {address}"))?;

    tracing::info!(%address, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server shut down gracefully");
    Ok(())
}

/// Full application router: module routes, `/healthz`, OpenAPI and the
/// middleware stack.
pub fn build_router(registry: Arc<ModuleRegistry>, settings: &ServerSettings) -> Router {
    let health = Router::new()
        .route("/healthz", get(health_check))
        .with_state(registry.clone());

    RouterBuilder::new()
        .merge(health)
        .mount_modules(&registry)
        .with_openapi(&registry)
        .with_timeout(settings.request_timeout_ms)
        .with_cors()
        .with_tracing()
        .with_request_id()
        .build()
}

/// 200 when every module reports healthy, 503 otherwise.
async fn health_check(State(registry): State<Arc<ModuleRegistry>>) -> (StatusCode, Json<Value>) {
    let mut modules = Map::new();
    let mut healthy = true;
    for (name, health) in registry.health().await {
        healthy &= health.healthy;
        modules.insert(name.to_string(), json!(health));
    }

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = json!({
        "status": if healthy { "ok" } else { "degraded" },
        "modules": modules,
    });
    (status, Json(body))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT, starting graceful shutdown"),
        () = terminate => tracing::info!("received SIGTERM, starting graceful shutdown"),
    }
}
