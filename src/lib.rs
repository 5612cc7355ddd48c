//! Codex: a streaming AI coding assistant core.
//!
//! Streams a model's response, intercepts `shell` tool calls, and gates each
//! command behind a safety classification and an approval policy before the
//! consumer sees it.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use codex::prelude::*;
//!
//! # async fn example() -> codex::error::Result<()> {
//! let provider = Arc::new(OpenAiProvider::new("sk-...", None));
//! let options = AgentLoopOptions::builder().model("gpt-4.1").build();
//! let callbacks = LoopCallbacks::new().with_item_sink(|chunk| {
//!     if let Some(text) = chunk.as_text() {
//!         print!("{text}");
//!     }
//! });
//!
//! let mut agent = AgentLoop::new(provider, options, callbacks);
//! agent.run(&[Message::user("List the files here")]).await?;
//! # Ok(())
//! # }
//! ```

pub mod agent_loop;
pub mod config;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod safety;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
