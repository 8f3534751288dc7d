use anyhow::Context;
use clap::{Parser, Subcommand};

use lms_kernel::settings::Settings;

#[derive(Parser)]
#[command(name = "lms", version, about = "Library management service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API until SIGINT or SIGTERM.
    Serve {
        /// Load demo libraries, patrons and books on startup.
        #[arg(long)]
        seed: bool,
        /// Override `server.port`.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the effective settings as JSON.
    Config,
    /// Print the merged OpenAPI document as JSON.
    Openapi,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().context("failed to load LMS settings")?;

    match cli.command {
        Command::Serve { seed, port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            lms_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "lms serve");

            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(lms_app::run(settings, seed))
        }
        Command::Config => print_json(&serde_json::to_value(&settings)?),
        Command::Openapi => print_json(&lms_app::openapi_document(&settings)?),
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
