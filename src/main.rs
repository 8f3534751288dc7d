use anyhow::Context;
use lms_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load LMS settings")?;
    lms_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, "lms-app bootstrap starting");
    lms_app::run(settings, false).await
}
