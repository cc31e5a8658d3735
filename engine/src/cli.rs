//! CLI interface for the chat relay
//!
//! This module provides the command-line interface using clap's derive API.

use crate::telemetry::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chat Relay
///
/// Relays chat messages to a remote completion service, replaying each
/// user's recent conversation as context.
#[derive(Parser, Debug)]
#[command(name = "chatrelay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Log output format (pretty, json)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API until interrupted
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Persona to answer with (overrides config)
        #[arg(long)]
        persona: Option<String>,
    },

    /// Send one message and print the reply
    Chat {
        /// User identifier
        #[arg(short, long)]
        user: String,

        /// The message to send
        message: String,

        /// Persona to answer with (overrides config)
        #[arg(long)]
        persona: Option<String>,
    },

    /// Show a user's recent exchanges, oldest first
    History {
        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Number of exchanges to show
        #[arg(short, long, default_value = "5")]
        limit: u32,
    },

    /// List available personas
    Personas,
}
