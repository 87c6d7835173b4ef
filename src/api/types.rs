use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

pub mod interaction_type {
    pub const PING: u8 = 1;
    pub const APPLICATION_COMMAND: u8 = 2;
}

pub mod response_type {
    pub const PONG: u8 = 1;
    pub const CHANNEL_MESSAGE: u8 = 4;
    pub const DEFERRED_CHANNEL_MESSAGE: u8 = 5;
}

/// Inbound interaction, reduced to the fields the bot reads.
#[derive(Debug, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub data: Option<InteractionData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InteractionData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub resolved: Option<ResolvedData>,
    #[serde(default)]
    pub target_id: Option<String>,
}

impl InteractionData {
    /// String value of a named option.
    #[must_use]
    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_ref())
            .and_then(Value::as_str)
    }

    /// Content of the message a context command was invoked on.
    #[must_use]
    pub fn target_message(&self) -> Option<&str> {
        let messages = &self.resolved.as_ref()?.messages;
        let message = self
            .target_id
            .as_ref()
            .and_then(|id| messages.get(id))
            .or_else(|| messages.values().next())?;
        Some(message.content.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResolvedData {
    #[serde(default)]
    pub messages: HashMap<String, ResolvedMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ResolvedMessage {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub content: String,
}

impl InteractionResponse {
    #[must_use]
    pub const fn pong() -> Self {
        Self {
            kind: response_type::PONG,
            data: None,
        }
    }

    #[must_use]
    pub const fn deferred() -> Self {
        Self {
            kind: response_type::DEFERRED_CHANNEL_MESSAGE,
            data: None,
        }
    }

    #[must_use]
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: response_type::CHANNEL_MESSAGE,
            data: Some(MessageData {
                content: content.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FollowupRequest {
    pub token: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct FollowupResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_command_payload() {
        let json = r#"{
            "type": 2,
            "token": "abc",
            "data": {
                "name": "Generate Draft",
                "type": 3,
                "target_id": "222",
                "resolved": {"messages": {
                    "111": {"id": "111", "content": "other"},
                    "222": {"id": "222", "content": "AI plugins are booming"}
                }}
            }
        }"#;
        let interaction: Interaction = serde_json::from_str(json).unwrap();
        assert_eq!(interaction.kind, interaction_type::APPLICATION_COMMAND);
        let data = interaction.data.unwrap();
        assert_eq!(data.target_message(), Some("AI plugins are booming"));
    }

    #[test]
    fn test_option_lookup() {
        let json = r#"{"name":"outlines","options":[{"name":"topic","type":3,"value":"lofi"}]}"#;
        let data: InteractionData = serde_json::from_str(json).unwrap();
        assert_eq!(data.option_str("topic"), Some("lofi"));
        assert_eq!(data.option_str("other"), None);
        assert!(data.target_message().is_none());
    }

    #[test]
    fn test_response_shapes() {
        assert_eq!(
            serde_json::to_value(InteractionResponse::pong()).unwrap(),
            serde_json::json!({"type": 1})
        );
        assert_eq!(
            serde_json::to_value(InteractionResponse::message("hi")).unwrap(),
            serde_json::json!({"type": 4, "data": {"content": "hi"}})
        );
    }
}
