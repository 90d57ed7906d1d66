//! Parsing the structured replies of the QA prompts.

use crate::relevance::NEUTRAL_SCORE;
use regex::Regex;
use std::sync::LazyLock;

static CONFIDENCE_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)confidence\s*[:=]\s*(\d+)").ok());

static ANSWER_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*answer\s*:\s*(.+?)\s*$").ok());

/// The `CONFIDENCE: n` value when present and within 1..=10.
pub fn parse_confidence(response: &str) -> Option<u8> {
    let caps = CONFIDENCE_LINE.as_ref()?.captures(response)?;
    let value: u8 = caps.get(1)?.as_str().parse().ok()?;
    (1..=10).contains(&value).then_some(value)
}

/// Confidence, or [`NEUTRAL_SCORE`] with a warning when missing or out of range.
pub fn confidence_or_neutral(response: &str) -> u8 {
    parse_confidence(response).unwrap_or_else(|| {
        tracing::warn!(
            response = %response.trim(),
            "Unparseable confidence, using neutral {}",
            NEUTRAL_SCORE
        );
        NEUTRAL_SCORE
    })
}

/// The `ANSWER:` line, or the whole reply when there is none.
///
/// Trailing periods are dropped and yes/no/maybe are lower-cased.
pub fn parse_answer(response: &str) -> String {
    let raw = ANSWER_LINE
        .as_ref()
        .and_then(|re| re.captures(response))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(response);

    let answer = raw.trim().trim_end_matches('.').trim_end();
    let lower = answer.to_lowercase();
    match lower.as_str() {
        "yes" | "no" | "maybe" => lower,
        _ => answer.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_confidence() {
        assert_eq!(parse_confidence("CONFIDENCE: 9\nANSWER: yes"), Some(9));
        assert_eq!(parse_confidence("confidence=10"), Some(10));
        assert_eq!(parse_confidence("Confidence : 3 (low)"), Some(3));
    }

    #[test]
    fn test_confidence_fallback() {
        assert_eq!(parse_confidence("CONFIDENCE: 0"), None);
        assert_eq!(parse_confidence("CONFIDENCE: 11"), None);
        assert_eq!(parse_confidence("CONFIDENCE: 999"), None);
        assert_eq!(parse_confidence("ANSWER: yes"), None);
        assert_eq!(confidence_or_neutral("I am fairly sure"), NEUTRAL_SCORE);
    }

    #[test]
    fn test_parse_answer_line() {
        assert_eq!(parse_answer("CONFIDENCE: 9\nANSWER: yes"), "yes");
        assert_eq!(parse_answer("ANSWER: No."), "no");
        assert_eq!(parse_answer("answer:   MAYBE  \n"), "maybe");
        assert_eq!(
            parse_answer("ANSWER: Probably, in adults."),
            "Probably, in adults"
        );
    }

    #[test]
    fn test_parse_answer_without_line() {
        assert_eq!(parse_answer("  Yes.\n"), "yes");
        assert_eq!(parse_answer("It depends on dose"), "It depends on dose");
    }
}
