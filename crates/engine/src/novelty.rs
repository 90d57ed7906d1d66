//! Detecting questions that need knowledge newer than the model's training.

use regex::Regex;
use std::sync::LazyLock;

/// Earliest publication year treated as recent.
pub const RECENT_YEAR_FROM: u32 = 2024;

/// Latest year accepted as a plausible publication year.
const RECENT_YEAR_UNTIL: u32 = 2099;

/// Recency phrases as `(tag, pattern)`. Matched case-insensitively on word
/// boundaries.
const RECENCY_PATTERNS: &[(&str, &str)] = &[
    ("recent", r"(?i)\brecent\b"),
    ("latest", r"(?i)\blatest\b"),
    ("new_study", r"(?i)\bnew\s+study\b"),
    ("new_research", r"(?i)\bnew\s+research\b"),
    ("newly_published", r"(?i)\bnewly\s+published\b"),
    ("this_year", r"(?i)\bthis\s+year\b"),
    ("last_month", r"(?i)\blast\s+month\b"),
    ("just_published", r"(?i)\bjust\s+published\b"),
];

static RECENCY_REGEXES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    RECENCY_PATTERNS
        .iter()
        .filter_map(|(tag, pattern)| Regex::new(pattern).ok().map(|re| (*tag, re)))
        .collect()
});

static DIGIT_RUN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d+").ok());

/// True if `question` mentions a recent year or uses recency vocabulary.
pub fn detect_novelty(question: &str) -> bool {
    if question.trim().is_empty() {
        return false;
    }

    if let Some(year) = recent_year(question) {
        tracing::debug!(year, "Novelty: recent year mentioned");
        return true;
    }

    match recency_tag(question) {
        Some(tag) => {
            tracing::debug!(tag, "Novelty: recency phrase");
            true
        }
        None => false,
    }
}

/// First standalone four-digit recent year in `text`.
///
/// A digit run touching a letter on either side is part of an identifier
/// ("NCT2024") and never counts.
pub fn recent_year(text: &str) -> Option<u32> {
    let digits = DIGIT_RUN.as_ref()?;

    digits.find_iter(text).find_map(|m| {
        if m.as_str().len() != 4 {
            return None;
        }
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        if before.is_some_and(char::is_alphabetic) || after.is_some_and(char::is_alphabetic) {
            return None;
        }
        let year: u32 = m.as_str().parse().ok()?;
        (RECENT_YEAR_FROM..=RECENT_YEAR_UNTIL)
            .contains(&year)
            .then_some(year)
    })
}

/// Tag of the first recency phrase found in `text`.
pub fn recency_tag(text: &str) -> Option<&'static str> {
    RECENCY_REGEXES
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(tag, _)| *tag)
}
