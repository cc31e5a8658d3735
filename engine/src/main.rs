// Chat Relay
// Main entry point for the chatrelay binary

use clap::Parser;
use chatrelay_engine::cli::{Cli, Command};
use chatrelay_engine::config::Config;
use chatrelay_engine::handlers::{
    handle_chat, handle_history, handle_personas, handle_serve, OutputFormat,
};
use chatrelay_engine::secrets;
use chatrelay_engine::telemetry::{init_telemetry, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // .env first so the API key and RUST_LOG can come from it
    secrets::load_dotenv();

    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry(log_level, cli.log_format.unwrap_or_else(LogFormat::for_build));

    tracing::info!("Chat Relay v{}", env!("CARGO_PKG_VERSION"));

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command {
        Command::Serve {
            host,
            port,
            persona,
        } => handle_serve(&config, host, port, persona).await,

        Command::Chat {
            user,
            message,
            persona,
        } => handle_chat(&config, user, message, persona, format).await,

        Command::History { user, limit } => handle_history(&config, user, limit, format).await,

        Command::Personas => handle_personas(&config, format),
    }
}
