//! Prompt assembly
//!
//! Flattens a user's history window and new message into a plain transcript:
//!
//! ```text
//! User: <message 1>
//! Bot: <response 1>
//! ...
//! User: <new message>
//! Bot:
//! ```
//!
//! The persona's system instruction travels beside the transcript, never
//! inside it. No truncation happens here; the history window is already
//! bounded by the store query.

use crate::llm::Message;
use crate::memory::Exchange;

const USER_PREFIX: &str = "User: ";
const BOT_PREFIX: &str = "Bot: ";
const BOT_CUE: &str = "Bot:";

/// System instruction plus flattened transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system_instruction: String,
    pub transcript: String,
}

impl Prompt {
    /// The two-message list sent to the completion service
    pub fn to_messages(&self) -> Vec<Message> {
        vec![
            Message::system(&self.system_instruction),
            Message::user(&self.transcript),
        ]
    }
}

/// Build a prompt from history and the new message
pub fn build(system_instruction: &str, history: &[Exchange], new_message: &str) -> Prompt {
    Prompt {
        system_instruction: system_instruction.to_string(),
        transcript: render_transcript(history, new_message),
    }
}

/// Render the transcript text alone
pub fn render_transcript(history: &[Exchange], new_message: &str) -> String {
    let mut lines = Vec::with_capacity(history.len() * 2 + 2);
    for exchange in history {
        lines.push(format!("{}{}", USER_PREFIX, exchange.message));
        lines.push(format!("{}{}", BOT_PREFIX, exchange.response));
    }
    lines.push(format!("{}{}", USER_PREFIX, new_message));
    lines.push(BOT_CUE.to_string());

    lines.join("\n")
}
