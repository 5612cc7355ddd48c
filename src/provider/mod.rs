//! Model provider trait and the built-in OpenAI implementation.

pub mod http;
pub mod openai;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::CodexError;
use crate::types::{Message, StreamChunk};

pub use openai::OpenAiProvider;

/// A streaming request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub model: String,
    /// System instructions; providers prepend them when non-empty.
    pub instructions: String,
    pub messages: Vec<Message>,
}

/// Stream of chunks produced by a provider, in arrival order.
pub type ChunkStream = BoxStream<'static, Result<StreamChunk, CodexError>>;

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    /// Open a streaming completion.
    ///
    /// Return [`CodexError::Configuration`] when the provider cannot be used
    /// at all (missing credentials); any other error is treated as a
    /// transport failure and may be retried.
    async fn open_stream(&self, request: &ProviderRequest) -> Result<ChunkStream, CodexError>;
}
