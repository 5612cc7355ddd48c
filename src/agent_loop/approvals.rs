//! Approval policies and the command approval engine.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::safety::{self, Command};

/// Operator-selected approval policy for a run.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ApprovalPolicy {
    /// Ask before running anything not known to be safe.
    #[default]
    Suggest,
    /// Automatic file edits; commands are gated exactly like `Suggest`.
    AutoEdit,
    /// Run everything, unclassified commands inside a sandbox.
    FullAuto,
}

/// Outcome of [`can_auto_approve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SafetyAssessment {
    AutoApprove {
        reason: String,
        group: String,
        /// True only for the full-auto fallback, never for a classified match.
        run_in_sandbox: bool,
    },
    AskUser,
}

/// The two-way decision carried by a [`SafetyAssessment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Decision {
    AutoApprove,
    AskUser,
}

impl SafetyAssessment {
    pub fn decision(&self) -> Decision {
        match self {
            Self::AutoApprove { .. } => Decision::AutoApprove,
            Self::AskUser => Decision::AskUser,
        }
    }

    pub fn is_auto_approved(&self) -> bool {
        matches!(self, Self::AutoApprove { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::AutoApprove { reason, .. } => Some(reason),
            Self::AskUser => None,
        }
    }

    pub fn group(&self) -> Option<&str> {
        match self {
            Self::AutoApprove { group, .. } => Some(group),
            Self::AskUser => None,
        }
    }

    pub fn run_in_sandbox(&self) -> bool {
        matches!(
            self,
            Self::AutoApprove {
                run_in_sandbox: true,
                ..
            }
        )
    }
}

/// Decide whether `command` may run without asking the user.
pub fn can_auto_approve(command: &Command, policy: ApprovalPolicy) -> SafetyAssessment {
    if let Some(safe) = safety::classify(command) {
        return SafetyAssessment::AutoApprove {
            reason: safe.label,
            group: safe.group,
            run_in_sandbox: false,
        };
    }
    match policy {
        ApprovalPolicy::FullAuto => SafetyAssessment::AutoApprove {
            reason: "Full auto mode".to_string(),
            group: "Running commands".to_string(),
            run_in_sandbox: true,
        },
        ApprovalPolicy::Suggest | ApprovalPolicy::AutoEdit => SafetyAssessment::AskUser,
    }
}

/// An approval request emitted by the agent loop for a shell tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Provider-assigned tool call id, when the provider sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    pub command: Command,
    pub policy: ApprovalPolicy,
}

/// Answer to an [`ApprovalRequest`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Accept,
    Decline,
}

impl From<bool> for ApprovalDecision {
    fn from(accepted: bool) -> Self {
        if accepted {
            Self::Accept
        } else {
            Self::Decline
        }
    }
}

/// Async approval handler callback.
pub type ApprovalHandler =
    Arc<dyn Fn(ApprovalRequest) -> BoxFuture<'static, ApprovalDecision> + Send + Sync>;
