use std::process::ExitCode;

use tracing::{error, info};

use modulith::application::Backbone;
use modulith::config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load_validated() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    modulith::telemetry::init(&config.logging);

    let backbone = match Backbone::start(&config).await {
        Ok(backbone) => backbone,
        Err(e) => {
            error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };
    info!("Backbone running, press Ctrl-C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    backbone.shutdown().await;
    ExitCode::SUCCESS
}
