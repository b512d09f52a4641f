use std::process::ExitCode;

use clap::Parser;
use contact_service::{app, telemetry, Config};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    if let Err(err) = telemetry::init(config.log_format) {
        eprintln!("failed to install log subscriber: {err}");
        return ExitCode::FAILURE;
    }

    match app::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "fatal");
            ExitCode::FAILURE
        }
    }
}
