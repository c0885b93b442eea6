use std::process::ExitCode;

use clap::Parser;
use tickview_core::{DashboardConfig, DashboardService};
use tickview_web::{serve, telemetry, AppState, Cli, WebError};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "tickview failed to start");
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), WebError> {
    let cli = Cli::parse();
    telemetry::init(cli.debug)?;

    let config = cli.apply(DashboardConfig::from_env()?);
    let service = DashboardService::from_config(config)?;

    serve(cli.bind_addr(), AppState::new(service)).await
}
