use async_trait::async_trait;
use axum::Router;
use serde::Serialize;

/// Context handed to modules on init and start.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Liveness report returned by [`Module::health`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleHealth {
    pub healthy: bool,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl ModuleHealth {
    pub fn ok() -> Self {
        Self {
            healthy: true,
            details: serde_json::Value::Null,
        }
    }

    pub fn ok_with(details: serde_json::Value) -> Self {
        Self {
            healthy: true,
            details,
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            healthy: false,
            details: serde_json::json!({ "reason": reason.into() }),
        }
    }
}

/// A unit of the service: contributes routes, OpenAPI paths and lifecycle hooks.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; routes are mounted under `/api/{name}`.
    fn name(&self) -> &'static str;

    /// Called once at startup, before any module is started.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` and `components.schemas`) with paths
    /// relative to the module mount point.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn health(&self) -> ModuleHealth {
        ModuleHealth::ok()
    }
}
