//! Wiring: storage, module registry and the serve lifecycle.

use std::sync::Arc;

use anyhow::Context;

use lms_db::{DbModule, MemoryDatabase};
use lms_kernel::settings::Settings;
use lms_kernel::{InitCtx, ModuleRegistry};
use lms_telemetry::TelemetryModule;

use crate::modules;
use crate::seed::FakeDataSeeder;

/// Core modules (telemetry, db) plus libraries, books and patrons over `db`.
pub fn build_registry(settings: &Settings, db: Arc<MemoryDatabase>) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(TelemetryModule::new(settings.telemetry.clone())))?;
    registry.register_core(Arc::new(DbModule::new(db.clone())))?;
    modules::register_all(&mut registry, db)?;
    Ok(registry)
}

/// Merged OpenAPI document of every module, without starting anything.
pub fn openapi_document(settings: &Settings) -> anyhow::Result<serde_json::Value> {
    let registry = build_registry(settings, Arc::new(MemoryDatabase::new()))?;
    Ok(lms_http::openapi_document(&registry))
}

/// Init every module, optionally seed, serve until a shutdown signal, then
/// stop modules in reverse order.
pub async fn run(settings: Settings, seed: bool) -> anyhow::Result<()> {
    let db = Arc::new(MemoryDatabase::new());
    let registry = Arc::new(build_registry(&settings, db.clone())?);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;

    if seed || settings.seed.enabled {
        FakeDataSeeder::new(db, settings.seed.clone())
            .seed()
            .await
            .context("failed to seed demo data")?;
    }

    registry.start_all(&ctx).await?;
    tracing::info!(
        env = ?settings.environment,
        modules = registry.len(),
        "lms-app started"
    );

    let served = lms_http::start_server(registry.clone(), &settings.server).await;
    registry.stop_all().await?;
    served
}
