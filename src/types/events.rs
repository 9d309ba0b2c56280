//! Messages API stream events.

use super::{Role, StopReason, Usage};
use serde::{Deserialize, Serialize};

/// Stream events from the Messages API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageStreamEvent {
    /// Message started
    MessageStart {
        /// Message metadata, including input token usage
        message: PartialMessage,
    },
    /// Content block started
    ContentBlockStart {
        /// Position of the block within the message
        index: usize,
        /// Initial block content
        content_block: ContentBlock,
    },
    /// Content block delta (incremental update)
    ContentBlockDelta {
        /// Position of the block within the message
        index: usize,
        /// Incremental content
        delta: ContentDelta,
    },
    /// Content block stopped
    ContentBlockStop {
        /// Position of the block within the message
        index: usize,
    },
    /// Message delta (stop reason and output usage)
    MessageDelta {
        /// Top-level message changes
        delta: MessageDelta,
        /// Cumulative output usage
        usage: DeltaUsage,
    },
    /// Message stopped
    MessageStop,
    /// Ping event (keepalive)
    Ping,
    /// Any event type this crate does not know about
    #[serde(other)]
    Unknown,
}

impl MessageStreamEvent {
    /// Builds a `message_start` event.
    pub fn message_start(role: Role, input_tokens: u32) -> Self {
        MessageStreamEvent::MessageStart {
            message: PartialMessage {
                role,
                usage: Usage::new(input_tokens, 0),
                ..Default::default()
            },
        }
    }

    /// Builds a `content_block_delta` event carrying text.
    pub fn text_delta(index: usize, text: impl Into<String>) -> Self {
        MessageStreamEvent::ContentBlockDelta {
            index,
            delta: ContentDelta {
                delta_type: "text_delta".to_string(),
                text: Some(text.into()),
                partial_json: None,
                thinking: None,
            },
        }
    }

    /// Builds a `message_delta` event.
    pub fn message_delta(stop_reason: Option<StopReason>, output_tokens: u32) -> Self {
        MessageStreamEvent::MessageDelta {
            delta: MessageDelta {
                stop_reason,
                stop_sequence: None,
            },
            usage: DeltaUsage { output_tokens },
        }
    }

    /// Wire name of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            MessageStreamEvent::MessageStart { .. } => "message_start",
            MessageStreamEvent::ContentBlockStart { .. } => "content_block_start",
            MessageStreamEvent::ContentBlockDelta { .. } => "content_block_delta",
            MessageStreamEvent::ContentBlockStop { .. } => "content_block_stop",
            MessageStreamEvent::MessageDelta { .. } => "message_delta",
            MessageStreamEvent::MessageStop => "message_stop",
            MessageStreamEvent::Ping => "ping",
            MessageStreamEvent::Unknown => "unknown",
        }
    }
}

/// Message metadata sent with `message_start`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialMessage {
    /// Message ID
    #[serde(default)]
    pub id: String,
    /// Object type
    #[serde(rename = "type", default)]
    pub message_type: String,
    /// Author role
    pub role: Role,
    /// Model that produced the message
    #[serde(default)]
    pub model: String,
    /// Usage at message start
    pub usage: Usage,
}

impl Default for PartialMessage {
    fn default() -> Self {
        Self {
            id: String::new(),
            message_type: "message".to_string(),
            role: Role::Assistant,
            model: String::new(),
            usage: Usage::default(),
        }
    }
}

/// Initial content of a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text block
    Text {
        /// Initial text, usually empty
        text: String,
    },
    /// Tool use block
    ToolUse {
        /// Tool call ID
        id: String,
        /// Tool name
        name: String,
        /// Tool input, streamed later as JSON deltas
        input: serde_json::Value,
    },
    /// Extended thinking block
    Thinking {
        /// Initial thinking text
        thinking: String,
    },
    /// Block type not modelled here
    #[serde(other)]
    Other,
}

/// Incremental content for a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDelta {
    /// Delta type ("text_delta", "input_json_delta", "thinking_delta")
    #[serde(rename = "type")]
    pub delta_type: String,
    /// Text fragment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Tool input JSON fragment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_json: Option<String>,
    /// Thinking fragment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
}

/// Top-level message changes sent with `message_delta`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDelta {
    /// Reason generation stopped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    /// Stop sequence that was hit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequence: Option<String>,
}

/// Usage sent with `message_delta`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaUsage {
    /// Cumulative output tokens
    pub output_tokens: u32,
}
