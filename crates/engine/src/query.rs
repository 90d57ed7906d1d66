//! Turning a natural-language question into a PubMed search string.

use regex::Regex;
use std::sync::LazyLock;

/// Longest search query sent to the literature service, in characters.
pub const MAX_QUERY_CHARS: usize = 150;

/// "According to a 2025 meta-analysis, ..." and similar lead-ins.
static PREAMBLE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:according\s+to|based\s+on)\s+(?:(?:a|an|the)\s+)?(?:(?:recent|new|latest)\s+)?(?:\d{4}\s+)?(?:meta-analys[ie]s|systematic\s+reviews?|randomi[sz]ed\s+controlled\s+trials?|clinical\s+trials?|rcts?|studies|study|trials?|reviews?)\s*,\s*",
    )
    .ok()
});

static AUXILIARY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:does|do|did|is|are|was|were|can|could|should|will|would|has|have|may|might)\s+",
    )
    .ok()
});

/// Search-engine friendly form of `question`.
///
/// Strips a citation lead-in, a leading auxiliary verb and trailing
/// question marks, collapses whitespace, then cuts to [`MAX_QUERY_CHARS`]
/// characters without regard to word boundaries. The cut is trimmed again
/// so the query never ends in a space or `?`.
pub fn expand_query(question: &str) -> String {
    let mut query = question.trim();

    if let Some(m) = PREAMBLE.as_ref().and_then(|re| re.find(query)) {
        query = &query[m.end()..];
    }
    if let Some(m) = AUXILIARY.as_ref().and_then(|re| re.find(query)) {
        query = &query[m.end()..];
    }

    let collapsed = trim_tail(query).split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(MAX_QUERY_CHARS).collect();
    trim_tail(&truncated).to_string()
}

fn trim_tail(query: &str) -> &str {
    query.trim_end_matches(|c: char| c == '?' || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_meta_analysis_preamble() {
        assert_eq!(
            expand_query("According to a 2025 meta-analysis, does ketamine help depression?"),
            "ketamine help depression"
        );
    }

    #[test]
    fn test_other_preambles() {
        assert_eq!(
            expand_query("Based on a 2025 RCT, is drug X effective?"),
            "drug X effective"
        );
        assert_eq!(
            expand_query("According to 2025 studies, does SGLT-2 inhibition reduce heart failure?"),
            "SGLT-2 inhibition reduce heart failure"
        );
        assert_eq!(
            expand_query("based on the latest systematic review,   can exercise treat insomnia?"),
            "exercise treat insomnia"
        );
    }

    #[test]
    fn test_auxiliary_only() {
        assert_eq!(expand_query("Does aspirin reduce pain?"), "aspirin reduce pain");
        assert_eq!(expand_query("Is isoniazid hepatotoxic?"), "isoniazid hepatotoxic");
    }

    #[test]
    fn test_plain_question_kept() {
        assert_eq!(expand_query("What causes headaches?"), "What causes headaches");
        assert_eq!(expand_query("Isoniazid liver injury"), "Isoniazid liver injury");
    }

    #[test]
    fn test_trailing_question_marks_removed() {
        assert_eq!(expand_query("Does it work??"), "it work");
        assert_eq!(expand_query("Does it work ? ?"), "it work");
        assert_eq!(expand_query("?"), "");
        assert_eq!(expand_query(""), "");
    }

    #[test]
    fn test_truncation_never_ends_in_space_or_question_mark() {
        // The cut lands right after a space.
        let question = format!("{} tail words here", "a".repeat(MAX_QUERY_CHARS - 1));
        let query = expand_query(&question);
        assert_eq!(query, "a".repeat(MAX_QUERY_CHARS - 1));

        // The cut lands right after an inner question mark.
        let question = format!("{}? and more", "b".repeat(MAX_QUERY_CHARS - 1));
        let query = expand_query(&question);
        assert_eq!(query, "b".repeat(MAX_QUERY_CHARS - 1));
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(
            expand_query("  Do \t statins\n lower   LDL ?  "),
            "statins lower LDL"
        );
    }

    #[test]
    fn test_truncated_mid_word() {
        let question = format!("Does {}?", "a".repeat(400));
        let query = expand_query(&question);
        assert_eq!(query.chars().count(), MAX_QUERY_CHARS);
        assert!(!query.ends_with('?'));
    }

    #[test]
    fn test_truncation_counts_characters() {
        let question = "é".repeat(200);
        assert_eq!(expand_query(&question).chars().count(), MAX_QUERY_CHARS);
    }
}
