//! Core run types for the agent loop.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::safety::Command;

/// Unique run identifier, used to correlate log lines.
pub type RunId = Uuid;

/// How a successful `run` ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The provider closed the stream normally.
    Completed,
    /// The user declined `command`; nothing after it was forwarded.
    Aborted { command: Command },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}
