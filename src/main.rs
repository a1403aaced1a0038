use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use formrelay::{Config, SmtpTransport, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = formrelay::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        formrelay::logging::init_console_only(&config.logging.level);
    }

    info!("formrelay - contact form relay");

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    let transport = match SmtpTransport::new(&config.smtp) {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            error!("Failed to configure SMTP transport: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        relay = %config.smtp.relay,
        port = config.smtp.port,
        "SMTP transport configured"
    );

    let server = match WebServer::new(&config, transport) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create web server: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!("Server configured on {}", server.addr());

    if let Err(e) = server.run().await {
        error!("Web server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
