//! Personas
//!
//! A persona is the system instruction plus model selection that shapes the
//! remote model's reply style. Two personas ship built in; more can be
//! declared under `[[personas]]` in config.toml.

use serde::{Deserialize, Serialize};

/// Model used by the built-in personas
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Name of the persona selected when config.toml does not name one
pub const DEFAULT_PERSONA: &str = "naija";

/// System instruction plus model identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Persona {
    /// Name used to select the persona from config or the CLI
    pub name: String,

    /// Behavior guidance sent as the system message
    pub system_instruction: String,

    /// Model identifier sent to the completion service
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Persona {
    /// Create a new persona
    pub fn new(
        name: impl Into<String>,
        system_instruction: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            system_instruction: system_instruction.into(),
            model: model.into(),
        }
    }

    /// Neutral assistant persona
    pub fn assistant() -> Self {
        Self::new(
            "assistant",
            "You are a helpful assistant. Give clear, friendly and accurate answers.",
            DEFAULT_MODEL,
        )
    }

    /// Stylized Nigerian-slang persona
    pub fn naija() -> Self {
        Self::new(
            "naija",
            "You're a funny Nigerian assistant. Use slang like 'Omo', 'Wahala', 'No vex', \
             but also give smart answers.",
            DEFAULT_MODEL,
        )
    }

    /// All built-in personas
    pub fn builtins() -> Vec<Self> {
        vec![Self::assistant(), Self::naija()]
    }

    /// Look up a persona by name.
    ///
    /// Custom personas shadow built-ins with the same name.
    pub fn resolve(name: &str, custom: &[Persona]) -> Option<Persona> {
        custom
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .or_else(|| Self::builtins().into_iter().find(|p| p.name == name))
    }

    /// Names of every persona available with the given custom set
    pub fn available(custom: &[Persona]) -> Vec<String> {
        let mut names: Vec<String> = Self::builtins().into_iter().map(|p| p.name).collect();
        for persona in custom {
            if !names.contains(&persona.name) {
                names.push(persona.name.clone());
            }
        }
        names
    }
}
