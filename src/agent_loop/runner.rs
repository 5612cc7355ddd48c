//! The streaming agent loop.

use std::sync::Arc;

use bon::Builder;
use futures::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::CodexError;
use crate::provider::{ModelProvider, ProviderRequest};
use crate::safety::Command;
use crate::types::{Message, StreamChunk};
use crate::util::retry::RetryPolicy;

use super::approvals::{
    can_auto_approve, ApprovalDecision, ApprovalPolicy, ApprovalRequest, SafetyAssessment,
};
use super::callbacks::LoopCallbacks;
use super::types::{RunId, RunOutcome};

/// Settings fixed for the lifetime of an [`AgentLoop`].
#[derive(Debug, Clone, Builder)]
pub struct AgentLoopOptions {
    #[builder(into)]
    pub model: String,
    #[builder(into, default)]
    pub instructions: String,
    #[builder(default)]
    pub approval_policy: ApprovalPolicy,
    #[builder(default)]
    pub retry: RetryPolicy,
}

/// Drives one streamed conversation turn at a time.
///
/// Each chunk is handled in arrival order. Shell tool calls are gated through
/// [`can_auto_approve`] and, when that says [`SafetyAssessment::AskUser`],
/// through the approval callback; everything else goes straight to
/// `on_item`.
pub struct AgentLoop {
    provider: Arc<dyn ModelProvider>,
    options: AgentLoopOptions,
    callbacks: LoopCallbacks,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        options: AgentLoopOptions,
        callbacks: LoopCallbacks,
    ) -> Self {
        Self {
            provider,
            options,
            callbacks,
        }
    }

    pub fn options(&self) -> &AgentLoopOptions {
        &self.options
    }

    /// Run one turn with the policy chosen at construction.
    ///
    /// Takes `&mut self`: a loop serves a single run at a time.
    pub async fn run(&mut self, messages: &[Message]) -> Result<RunOutcome, CodexError> {
        let policy = self.options.approval_policy;
        self.run_with_policy(messages, policy).await
    }

    /// Run one turn with an explicit approval policy.
    pub async fn run_with_policy(
        &mut self,
        messages: &[Message],
        policy: ApprovalPolicy,
    ) -> Result<RunOutcome, CodexError> {
        if messages.is_empty() {
            return Err(CodexError::InvalidArgument(
                "run requires at least one message".into(),
            ));
        }

        let run_id: RunId = Uuid::new_v4();
        let request = ProviderRequest {
            model: self.options.model.clone(),
            instructions: self.options.instructions.clone(),
            messages: messages.to_vec(),
        };
        debug!(
            %run_id,
            provider = self.provider.provider_name(),
            model = %request.model,
            messages = request.messages.len(),
            %policy,
            "codex run start"
        );

        let this = &*self;
        let request = &request;
        let result = this
            .options
            .retry
            .execute(move |attempt| this.attempt(request, policy, attempt))
            .await;

        match &result {
            Ok(RunOutcome::Completed) => debug!(%run_id, "codex run completed"),
            Ok(RunOutcome::Aborted { command }) => {
                info!(%run_id, %command, "codex run aborted by user")
            }
            Err(err) => warn!(%run_id, error = %err, "codex run failed"),
        }
        result
    }

    async fn attempt(
        &self,
        request: &ProviderRequest,
        policy: ApprovalPolicy,
        attempt: u32,
    ) -> Result<RunOutcome, CodexError> {
        debug!(attempt, "opening provider stream");
        let mut stream = self.provider.open_stream(request).await?;
        (self.callbacks.on_loading)(true);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if let Some(command) = chunk.shell_command() {
                if !self.approve(&chunk, &command, policy).await {
                    return Ok(RunOutcome::Aborted { command });
                }
            }
            (self.callbacks.on_item)(chunk);
        }

        (self.callbacks.on_loading)(false);
        Ok(RunOutcome::Completed)
    }

    /// Gate a single shell call. Returns whether the run may continue.
    async fn approve(
        &self,
        chunk: &StreamChunk,
        command: &Command,
        policy: ApprovalPolicy,
    ) -> bool {
        match can_auto_approve(command, policy) {
            SafetyAssessment::AutoApprove {
                reason,
                group,
                run_in_sandbox,
            } => {
                info!(%command, %reason, %group, run_in_sandbox, "shell command auto-approved");
                true
            }
            SafetyAssessment::AskUser => {
                let request = ApprovalRequest {
                    call_id: chunk.call_id().map(str::to_string),
                    command: command.clone(),
                    policy,
                };
                let decision = (self.callbacks.on_approval)(request).await;
                info!(%command, ?decision, "shell command reviewed");
                decision == ApprovalDecision::Accept
            }
        }
    }
}
