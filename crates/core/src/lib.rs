//! PubMed Assistant Core Library
//!
//! This crate provides the foundational utilities shared by every crate in the
//! workspace:
//! - Error handling (`AppError`, `AppResult`, `ErrorKind`)
//! - Logging infrastructure
//! - Configuration management (including engine tuning for QA and synthesis)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, QaConfig, SynthConfig};
pub use error::{AppError, AppResult, ErrorKind};
