//! Consumer callbacks injected into the agent loop.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;

use crate::types::StreamChunk;

use super::approvals::{ApprovalDecision, ApprovalHandler, ApprovalRequest};

/// Receives every forwarded chunk.
pub type ItemSink = Arc<dyn Fn(StreamChunk) + Send + Sync>;

/// Receives loading-start (`true`) and loading-stop (`false`) signals.
pub type LoadingSink = Arc<dyn Fn(bool) + Send + Sync>;

/// The callbacks an [`AgentLoop`](super::AgentLoop) drives.
///
/// The default set drops items, ignores loading signals, and declines every
/// approval request.
#[derive(Clone)]
pub struct LoopCallbacks {
    pub on_item: ItemSink,
    pub on_loading: LoadingSink,
    pub on_approval: ApprovalHandler,
}

impl Default for LoopCallbacks {
    fn default() -> Self {
        Self {
            on_item: Arc::new(|_: StreamChunk| {}),
            on_loading: Arc::new(|_: bool| {}),
            on_approval: Arc::new(|_: ApprovalRequest| {
                futures::future::ready(ApprovalDecision::Decline).boxed()
            }),
        }
    }
}

impl fmt::Debug for LoopCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopCallbacks").finish_non_exhaustive()
    }
}

impl LoopCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item_sink(mut self, sink: impl Fn(StreamChunk) + Send + Sync + 'static) -> Self {
        self.on_item = Arc::new(sink);
        self
    }

    pub fn with_loading_sink(mut self, sink: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.on_loading = Arc::new(sink);
        self
    }

    pub fn with_approval_handler(mut self, handler: ApprovalHandler) -> Self {
        self.on_approval = handler;
        self
    }

    /// Use a synchronous predicate as the approval handler.
    ///
    /// The predicate runs on tokio's blocking pool, so it may wait on a
    /// terminal prompt. `true` accepts the command.
    pub fn with_blocking_approval(
        self,
        approve: impl Fn(&ApprovalRequest) -> bool + Send + Sync + 'static,
    ) -> Self {
        let approve = Arc::new(approve);
        self.with_approval_handler(Arc::new(move |request: ApprovalRequest| {
            let approve = Arc::clone(&approve);
            async move {
                tokio::task::spawn_blocking(move || approve(&request))
                    .await
                    .map(ApprovalDecision::from)
                    .unwrap_or(ApprovalDecision::Decline)
            }
            .boxed()
        }))
    }
}
