// ABOUTME: Wire types for Discord interaction webhooks.
// ABOUTME: Incoming Interaction payloads and the responses sent back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Interaction type: ping from Discord's endpoint check.
pub const PING: u8 = 1;
/// Interaction type: a slash command invocation.
pub const APPLICATION_COMMAND: u8 = 2;

/// Response type: acknowledge a ping.
pub const PONG: u8 = 1;
/// Response type: reply with a message.
pub const CHANNEL_MESSAGE: u8 = 4;

/// Message flag that shows the reply only to the invoking user.
pub const EPHEMERAL: u64 = 1 << 6;

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub data: Option<CommandData>,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub user: Option<User>,
}

impl Interaction {
    /// Name of whoever invoked the interaction, for logging.
    pub fn invoker(&self) -> Option<&str> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
            .map(|u| u.username.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

impl CommandData {
    fn option(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_ref())
    }

    /// String option, trimmed; blank counts as absent.
    pub fn string(&self, name: &str) -> Option<String> {
        self.option(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.option(name).and_then(Value::as_bool)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseData {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: PONG,
            data: None,
        }
    }

    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: CHANNEL_MESSAGE,
            data: Some(ResponseData {
                content: content.into(),
                flags: None,
            }),
        }
    }

    /// A reply only the invoking user sees.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            kind: CHANNEL_MESSAGE,
            data: Some(ResponseData {
                content: content.into(),
                flags: Some(EPHEMERAL),
            }),
        }
    }
}
