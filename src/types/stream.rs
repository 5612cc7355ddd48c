//! Streaming chunk types.

use serde::{Deserialize, Serialize};

use crate::safety::Command;

/// Name of the tool the model calls to run a shell command.
pub const SHELL_TOOL_NAME: &str = "shell";

/// One incremental unit of a streamed model response.
///
/// Providers translate their wire format into this enum once; the agent loop
/// never probes raw payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    /// Incremental assistant text.
    TextDelta { text: String },
    /// A complete tool invocation.
    ToolCall {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        arguments: serde_json::Value,
    },
    /// Anything else the provider sent, passed through untouched.
    Other { raw: serde_json::Value },
}

impl StreamChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextDelta { text: text.into() }
    }

    pub fn tool_call(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self::ToolCall {
            id: None,
            name: name.into(),
            arguments,
        }
    }

    /// Convenience for a `shell` tool call with a `command` argument.
    pub fn shell(command: impl Into<String>) -> Self {
        Self::tool_call(
            SHELL_TOOL_NAME,
            serde_json::json!({ "command": command.into() }),
        )
    }

    pub fn other(raw: serde_json::Value) -> Self {
        Self::Other { raw }
    }

    /// Text carried by a `TextDelta`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::TextDelta { text } => Some(text),
            _ => None,
        }
    }

    /// The tool call id, if this is a tool call that has one.
    pub fn call_id(&self) -> Option<&str> {
        match self {
            Self::ToolCall { id, .. } => id.as_deref(),
            _ => None,
        }
    }

    /// The shell command this chunk asks to run.
    ///
    /// Returns `None` unless the chunk is a `shell` tool call whose
    /// `arguments.command` is a non-blank string. Anything else, including a
    /// malformed shell call, is ordinary content.
    pub fn shell_command(&self) -> Option<Command> {
        let Self::ToolCall {
            name, arguments, ..
        } = self
        else {
            return None;
        };
        if name != SHELL_TOOL_NAME {
            return None;
        }
        let line = arguments.get("command")?.as_str()?;
        Command::from_whitespace(line)
    }
}
