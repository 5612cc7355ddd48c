//! Convenience re-exports for common use.

pub use crate::agent_loop::{
    can_auto_approve, AgentLoop, AgentLoopOptions, ApprovalDecision, ApprovalPolicy,
    ApprovalRequest, LoopCallbacks, RunOutcome, SafetyAssessment,
};
pub use crate::error::{CodexError, Result};
pub use crate::provider::{ModelProvider, OpenAiProvider, ProviderRequest};
pub use crate::safety::{classify, Command, SafeCommand};
pub use crate::types::{Message, Role, StreamChunk};
pub use crate::util::retry::RetryPolicy;
