//! Chunk types delivered by streaming transports.
//!
//! These mirror the Anthropic wire format closely enough to be decoded
//! straight from server-sent event payloads with `serde_json`.

mod completion;
mod events;

pub use completion::Completion;
pub use events::{
    ContentBlock, ContentDelta, DeltaUsage, MessageDelta, MessageStreamEvent, PartialMessage,
};

use serde::{Deserialize, Serialize};

/// Token usage reported at the start of a message
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Number of input tokens
    pub input_tokens: u32,
    /// Number of output tokens
    #[serde(default)]
    pub output_tokens: u32,
}

impl Usage {
    /// Create a new Usage instance
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }
}

/// Reason why a message stopped generating
///
/// Values this crate does not know about decode to [`StopReason::Other`]
/// with the wire string preserved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of message
    EndTurn,
    /// Hit maximum token limit
    MaxTokens,
    /// Encountered a stop sequence
    StopSequence,
    /// Model decided to use a tool
    ToolUse,
    /// Any other stop reason, kept verbatim
    #[serde(untagged)]
    Other(String),
}

impl StopReason {
    /// Wire representation of the stop reason
    pub fn as_str(&self) -> &str {
        match self {
            StopReason::EndTurn => "end_turn",
            StopReason::MaxTokens => "max_tokens",
            StopReason::StopSequence => "stop_sequence",
            StopReason::ToolUse => "tool_use",
            StopReason::Other(reason) => reason,
        }
    }
}

/// Role of a message participant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User role
    User,
    /// Assistant role
    Assistant,
}

impl Role {
    /// Wire representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_reason_as_str_matches_serde() {
        for reason in [
            StopReason::EndTurn,
            StopReason::MaxTokens,
            StopReason::StopSequence,
            StopReason::ToolUse,
            StopReason::Other("pause_turn".to_string()),
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.as_str()));
        }
    }

    #[test]
    fn test_unknown_stop_reason_is_preserved() {
        let reason: StopReason = serde_json::from_str(r#""refusal""#).unwrap();
        assert_eq!(reason, StopReason::Other("refusal".to_string()));
        assert_eq!(reason.as_str(), "refusal");

        let known: StopReason = serde_json::from_str(r#""max_tokens""#).unwrap();
        assert_eq!(known, StopReason::MaxTokens);
    }

    #[test]
    fn test_role_as_str_matches_serde() {
        for role in [Role::User, Role::Assistant] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn test_usage_output_tokens_default() {
        let usage: Usage = serde_json::from_str(r#"{"input_tokens": 12}"#).unwrap();
        assert_eq!(usage, Usage::new(12, 0));
    }
}
