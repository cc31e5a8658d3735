//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - serve: Run the HTTP API
//! - chat: One request cycle from the terminal
//! - history: Show a user's recent exchanges
//! - personas: List available personas

use anyhow::{Context, Result};
use sdk::{ChatHandle, ChatRequest, ChatResponse};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::chat::ChatService;
use crate::config::Config;
use crate::db::Database;
use crate::llm::OpenAICompatClient;
use crate::memory::InteractionStore;
use crate::persona::Persona;
use crate::secrets;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Open the database and make sure the memory table exists
async fn open_store(config: &Config) -> Result<Database> {
    let database = Database::new(&config.db_path())
        .await
        .context("Failed to open database")?;

    database
        .interactions()
        .initialize()
        .await
        .context("Failed to initialize conversation memory")?;

    Ok(database)
}

/// Wire the request handler from config
///
/// `persona` overrides the configured persona when given.
pub fn build_service(
    config: &Config,
    database: &Database,
    persona: Option<&str>,
) -> Result<ChatService> {
    let persona = match persona {
        Some(name) => config.persona_named(name)?,
        None => config.active_persona()?,
    };

    let api_key = secrets::load_api_key(&config.llm.api_key_env);
    let client = OpenAICompatClient::new(config.llm.base_url.clone(), api_key);

    Ok(ChatService::new(
        Arc::new(database.interactions()),
        Arc::new(client),
        persona,
    )
    .with_history_limit(config.memory.history_limit))
}

/// Serve the HTTP API until Ctrl-C
pub async fn handle_serve(
    config: &Config,
    host: Option<String>,
    port: Option<u16>,
    persona: Option<String>,
) -> Result<()> {
    let database = open_store(config).await?;
    let service = build_service(config, &database, persona.as_deref())?;
    let persona_name = service.persona().name.clone();

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

    let mut server = api_server::APIServer::start(ChatHandle::new(Arc::new(service)), addr)
        .await
        .context("Failed to start API server")?;

    println!(
        "Chat relay listening on http://{} (persona: {})",
        server.addr(),
        persona_name
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    tracing::info!("Shutdown signal received");
    server.stop().await;
    database.close().await?;

    Ok(())
}

/// Send one message through the full request cycle
pub async fn handle_chat(
    config: &Config,
    user: String,
    message: String,
    persona: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let database = open_store(config).await?;
    let service = build_service(config, &database, persona.as_deref())?;

    let response = service.handle(&ChatRequest::new(user, message)).await?;

    match format {
        OutputFormat::Text => match &response {
            ChatResponse::Reply { response } => println!("{}", response),
            ChatResponse::Error { error } => eprintln!("Error: {}", secrets::scrub(error)),
        },
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
    }

    database.close().await?;
    Ok(())
}

/// Show a user's recent exchanges
pub async fn handle_history(
    config: &Config,
    user: String,
    limit: u32,
    format: OutputFormat,
) -> Result<()> {
    let database = open_store(config).await?;

    let exchanges = database
        .interactions()
        .recent(&user, limit)
        .await
        .context("Failed to fetch conversation history")?;

    match format {
        OutputFormat::Text => {
            if exchanges.is_empty() {
                println!("No history for {}", user);
            } else {
                println!("History for {} (last {} exchanges):", user, limit);
                println!();
                for exchange in &exchanges {
                    println!("User: {}", exchange.message);
                    println!("Bot: {}", exchange.response);
                    println!();
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "user": user,
                "exchanges": exchanges,
                "count": exchanges.len(),
                "limit": limit
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    database.close().await?;
    Ok(())
}

/// List built-in and configured personas
pub fn handle_personas(config: &Config, format: OutputFormat) -> Result<()> {
    let personas: Vec<Persona> = Persona::available(&config.personas)
        .iter()
        .filter_map(|name| Persona::resolve(name, &config.personas))
        .collect();

    match format {
        OutputFormat::Text => {
            for persona in &personas {
                let marker = if persona.name == config.llm.persona {
                    "*"
                } else {
                    " "
                };
                println!("{} {} ({})", marker, persona.name, persona.model);
                println!("    {}", persona.system_instruction);
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "active": config.llm.persona,
                "personas": personas,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
