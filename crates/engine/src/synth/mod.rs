//! Multi-paper literature synthesis and single-paper deep dives.

pub mod engine;
pub mod types;

pub use engine::SynthEngine;
pub use types::{SynthesisResult, TokenUsage};
