//! Agent loop primitives (runs, callbacks, approvals).

pub mod approvals;
pub mod callbacks;
pub mod runner;
pub mod types;

pub use approvals::*;
pub use callbacks::*;
pub use runner::*;
pub use types::*;
