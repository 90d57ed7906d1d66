//! Adaptive yes/no question answering.

pub mod adaptive;
pub mod parse;
pub mod types;

pub use adaptive::QaEngine;
pub use parse::{parse_answer, parse_confidence};
pub use types::{AnswerResult, Strategy};
