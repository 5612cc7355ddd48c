//! Core types for codex.

pub mod message;
pub mod stream;

pub use message::*;
pub use stream::*;
