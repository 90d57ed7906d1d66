//! Error types for the PubMed assistant.
//!
//! A single error enum covers configuration, I/O, collaborator failures
//! (text generation and literature search), policy outcomes such as "nothing
//! found", cancellation, prompt rendering and serialization. Callers that need
//! to react differently to each family use [`AppError::kind`].

use thiserror::Error;

/// Unified error type for the PubMed assistant.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller supplied something unusable (empty question, empty id list, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Text-generation collaborator failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// Search/fetch collaborator failed
    #[error("Literature service error: {0}")]
    Literature(String),

    /// The search returned no documents at all
    #[error("No papers found for query: {query}")]
    NoDocumentsFound { query: String },

    /// Documents were found but none reached the relevance threshold
    #[error("No papers met relevance threshold ({threshold}) for: {query}")]
    BelowRelevanceThreshold { threshold: u8, query: String },

    /// A specific document identifier could not be fetched
    #[error("Article not found: {0}")]
    DocumentNotFound(String),

    /// A controlled-vocabulary (MeSH) term has no descriptor
    #[error("MeSH term not found: {0}")]
    TermNotFound(String),

    /// The caller's cancellation token fired
    #[error("Cancelled during {0}")]
    Cancelled(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; nothing was attempted.
    InvalidInput,
    /// A collaborator (LLM or literature service) failed.
    Upstream,
    /// The pipeline ran but policy produced no usable result.
    Policy,
    /// The caller cancelled the operation.
    Cancelled,
    /// Local failures: config, I/O, prompts, serialization.
    Internal,
}

impl AppError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::Llm(_) | AppError::Literature(_) => ErrorKind::Upstream,
            AppError::NoDocumentsFound { .. }
            | AppError::BelowRelevanceThreshold { .. }
            | AppError::DocumentNotFound(_)
            | AppError::TermNotFound(_) => ErrorKind::Policy,
            AppError::Cancelled(_) => ErrorKind::Cancelled,
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Prompt(_)
            | AppError::Serialization(_)
            | AppError::Other(_) => ErrorKind::Internal,
        }
    }

    /// Whether this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    /// Prefix an upstream error message with the pipeline stage that failed.
    ///
    /// Non-upstream errors are returned unchanged.
    pub fn in_stage(self, stage: &str) -> Self {
        match self {
            AppError::Llm(msg) => AppError::Llm(format!("{}: {}", stage, msg)),
            AppError::Literature(msg) => AppError::Literature(format!("{}: {}", stage, msg)),
            other => other,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
