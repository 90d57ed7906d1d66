//! Extractive compression of abstracts to a character budget.
//!
//! Sentences are scored by a small rubric: structured-abstract labels that
//! introduce results or conclusions, findings vocabulary, and statistics.
//! The best sentences that fit are kept and re-emitted in their original
//! order. Nothing is paraphrased.

use regex::Regex;
use std::sync::LazyLock;

/// Bonus for a sentence opening with a results/conclusions label.
const LABEL_WEIGHT: usize = 10;
/// Bonus per findings-vocabulary hit.
const KEY_TERM_WEIGHT: usize = 2;
/// Bonus per statistical notation hit.
const STATISTIC_WEIGHT: usize = 3;

static SECTION_LABEL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:main\s+results?|key\s+findings|results?|conclusions?|findings|interpretation|outcomes?|summary)\s*:",
    )
    .ok()
});

static KEY_TERMS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:significant(?:ly)?|demonstrat\w*|effective(?:ness)?|efficacy|meta-analys[ie]s|systematic\s+review|randomi[sz]ed|associated\s+with|improve\w*|reduc\w*|increas\w*|superior|inferior|no\s+difference)\b",
    )
    .ok()
});

/// Statistical notations as `(tag, pattern)`.
const STATISTIC_PATTERNS: &[(&str, &str)] = &[
    ("percentage", r"\d+(?:\.\d+)?\s?%"),
    ("p_value", r"(?i)\bp\s*[<>=≤≥]\s*0?\.\d+"),
    ("confidence_interval", r"(?i)\b\d{2}\s?%\s*CI\b"),
    ("effect_ratio", r"\b(?:OR|RR|HR|aOR|aHR|SMD)\b"),
];

static STATISTICS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    STATISTIC_PATTERNS
        .iter()
        .filter_map(|(tag, pattern)| Regex::new(pattern).ok().map(|re| (*tag, re)))
        .collect()
});

/// Compress `text` to at most `max_chars` characters.
///
/// Text already within budget is returned unchanged. When no whole sentence
/// fits, the text is cut at `max_chars` characters.
pub fn minify_abstract(text: &str, max_chars: usize) -> String {
    if text.is_empty() || text.chars().count() <= max_chars {
        return text.to_string();
    }

    let sentences = split_sentences(text);
    let mut ranked: Vec<(usize, usize)> = sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| (index, score_sentence(sentence)))
        .collect();
    // Stable: equal scores keep their original order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut selected = Vec::new();
    let mut used = 0usize;
    for (index, _) in ranked {
        let len = sentences[index].chars().count();
        let needed = if selected.is_empty() { len } else { used + 1 + len };
        if needed > max_chars {
            break;
        }
        used = needed;
        selected.push(index);
    }

    if selected.is_empty() {
        return text.chars().take(max_chars).collect();
    }

    selected.sort_unstable();
    let minified = selected
        .iter()
        .map(|&i| sentences[i])
        .collect::<Vec<_>>()
        .join(" ");

    tracing::trace!(
        original = text.chars().count(),
        minified = minified.chars().count(),
        sentences = selected.len(),
        "Minified abstract"
    );
    minified
}

/// Split at `.`, `!` or `?` followed by whitespace or the end of text.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = match chars.peek() {
            None => true,
            Some((_, next)) => next.is_whitespace(),
        };
        if at_boundary {
            let end = i + c.len_utf8();
            push_trimmed(&mut sentences, &text[start..end]);
            start = end;
        }
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, sentence: &'a str) {
    let sentence = sentence.trim();
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
}

fn score_sentence(sentence: &str) -> usize {
    let mut score = 0;

    if SECTION_LABEL
        .as_ref()
        .is_some_and(|re| re.is_match(sentence))
    {
        score += LABEL_WEIGHT;
    }
    if let Some(re) = KEY_TERMS.as_ref() {
        score += KEY_TERM_WEIGHT * re.find_iter(sentence).count();
    }
    for (_, re) in STATISTICS.iter() {
        score += STATISTIC_WEIGHT * re.find_iter(sentence).count();
    }

    score
}
