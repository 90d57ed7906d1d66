//! Synthesis result types.

use crate::citation::Reference;
use serde::Serialize;

/// Approximate token counters. Character-based estimates, not billing data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input: usize,
    pub output: usize,
    pub total: usize,
}

impl TokenUsage {
    pub fn new(input: usize, output: usize) -> Self {
        Self {
            input,
            output,
            total: input + output,
        }
    }
}

/// A cited synthesis, or a single-paper summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisResult {
    pub question: String,
    pub synthesis: String,
    pub papers_searched: usize,
    pub papers_scored: usize,
    pub papers_used: usize,
    /// Ordered by rank
    pub references: Vec<Reference>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ris: String,
    pub tokens: TokenUsage,
}
