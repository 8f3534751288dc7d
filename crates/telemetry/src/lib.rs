//! Tracing bootstrap for the LMS service.

use anyhow::Context;
use async_trait::async_trait;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use lms_kernel::settings::{LogFormat, TelemetrySettings};
use lms_kernel::{InitCtx, Module, ModuleHealth};

/// Build the `EnvFilter`. `RUST_LOG` takes precedence over the configured
/// directives.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.filter)
            .with_context(|| format!("invalid log filter '{}'", settings.filter)),
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;
    let registry = tracing_subscriber::registry().with(filter);

    match settings.log_format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .try_init(),
    }
    .context("failed to install tracing subscriber")?;

    tracing::info!(
        target: "lms-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

/// Core module reporting the active log configuration.
pub struct TelemetryModule {
    settings: TelemetrySettings,
}

impl TelemetryModule {
    pub fn new(settings: TelemetrySettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Module for TelemetryModule {
    fn name(&self) -> &'static str {
        "telemetry"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::debug!(filter = %self.settings.filter, "telemetry module ready");
        Ok(())
    }

    async fn health(&self) -> ModuleHealth {
        ModuleHealth::ok_with(serde_json::json!({
            "log_format": format!("{:?}", self.settings.log_format).to_lowercase(),
        }))
    }
}
