//! Question-answering result types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the final answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// The model's own knowledge.
    Parametric,
    /// Retrieved abstracts added to the prompt.
    Retrieval,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Parametric => "parametric",
            Strategy::Retrieval => "retrieval",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`QaEngine::answer`](super::QaEngine::answer).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    pub question: String,
    /// Usually "yes", "no" or "maybe"
    pub answer: String,
    /// Self-reported confidence, 0 when never asked
    pub confidence: u8,
    pub strategy: Strategy,
    /// Whether the question looked like it needed recent knowledge
    pub novel: bool,
    /// PMIDs whose abstracts were shown to the model
    pub sources: Vec<String>,
    /// Evidence text shown to the model; empty for parametric answers
    pub context: String,
}
