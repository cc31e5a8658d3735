//! Chat Relay Engine Library
//!
//! This library provides the core functionality of the chat relay.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Secret management module
pub mod secrets;

/// Database persistence module
pub mod db;

/// Conversation memory abstraction
pub mod memory;

/// Prompt construction
pub mod prompt;

/// LLM provider abstraction layer
pub mod llm;

/// Built-in and configured personas
pub mod persona;

/// Request cycle: history, prompt, completion, persistence
pub mod chat;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
