//! Core shared types for Lift.
//!
//! This crate is intentionally small: file identities, byte ranges, and the
//! cancellation primitive used by long-running analyses.

mod cancel;
mod text;

pub use cancel::{CancellationToken, Cancelled};
pub use text::{FileId, TextRange};
