//! Configuration management
//!
//! This module handles loading, validation, and management of the relay
//! configuration. Configuration is stored in TOML format at
//! ~/.chatrelay/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, data directory, database file name
//! - **llm**: Completion service base URL, API key variable, active persona
//! - **memory**: History window size
//! - **server**: HTTP bind address
//! - **personas**: Optional custom personas
//!
//! The API key itself never lives in the file. `llm.api_key_env` names the
//! environment variable it is read from.
//!
//! # Examples
//!
//! ```no_run
//! use chatrelay_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//!
//! println!("Database: {:?}", config.db_path());
//! println!("Persona: {}", config.llm.persona);
//! # Ok(())
//! # }
//! ```

use crate::persona::{Persona, DEFAULT_PERSONA};
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    pub core: CoreConfig,

    /// Completion service settings
    pub llm: LLMConfig,

    /// History window settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Custom personas (optional)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personas: Vec<Persona>,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// SQLite file name inside the data directory
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Name of the active persona
    #[serde(default = "default_persona")]
    pub persona: String,
}

/// History window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Number of past exchanges replayed into each prompt
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.chatrelay")
}

fn default_db_file() -> String {
    "chat_memory.db".to_string()
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_persona() -> String {
    DEFAULT_PERSONA.to_string()
}

fn default_history_limit() -> u32 {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: default_data_dir(),
            db_file: default_db_file(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            persona: default_persona(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.chatrelay/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        // Serialize before processing so the file keeps the portable `~` form
        let mut config = Self::default();
        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        config.validate_and_process()?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Wrote default configuration to {}", path.display());
        Ok(config)
    }

    /// Get the default configuration file path (~/.chatrelay/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".chatrelay").join("config.toml"))
    }

    /// Full path of the SQLite file
    pub fn db_path(&self) -> PathBuf {
        self.core.data_dir.join(&self.core.db_file)
    }

    /// Resolve the active persona against built-ins and `[[personas]]`
    pub fn active_persona(&self) -> Result<Persona, EngineError> {
        self.persona_named(&self.llm.persona)
    }

    /// Resolve a persona by name
    pub fn persona_named(&self, name: &str) -> Result<Persona, EngineError> {
        Persona::resolve(name, &self.personas).ok_or_else(|| {
            EngineError::Config(format!(
                "Unknown persona '{}'. Must be one of: {}",
                name,
                Persona::available(&self.personas).join(", ")
            ))
        })
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates the log level, persona, history limit and base URL
    /// - Expands ~ in the data directory
    /// - Creates the data directory if it doesn't exist
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.core.db_file.trim().is_empty() {
            return Err(EngineError::Config("db_file must not be empty".to_string()));
        }

        if self.llm.base_url.trim().is_empty() {
            return Err(EngineError::Config("base_url must not be empty".to_string()));
        }
        self.llm.base_url = self.llm.base_url.trim_end_matches('/').to_string();

        if self.memory.history_limit == 0 {
            return Err(EngineError::Config(
                "history_limit must be at least 1".to_string(),
            ));
        }

        for persona in &self.personas {
            if persona.name.trim().is_empty() || persona.model.trim().is_empty() {
                return Err(EngineError::Config(
                    "Custom personas need a name and a model".to_string(),
                ));
            }
        }

        // Fails early on an unknown persona name
        self.active_persona()?;

        self.core.data_dir = expand_path(&self.core.data_dir)?;

        if !self.core.data_dir.exists() {
            fs::create_dir_all(&self.core.data_dir).map_err(|e| {
                EngineError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
