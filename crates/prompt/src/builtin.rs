//! Prompts compiled into the binary.

use crate::loader::parse_prompt;
use crate::types::PromptDefinition;
use pubmed_core::AppResult;

/// Self-rated confidence plus tentative answer.
pub const QA_CONFIDENCE: &str = "qa.confidence";
/// Answer from model knowledge alone.
pub const QA_PARAMETRIC: &str = "qa.parametric";
/// Answer conditioned on minified abstracts.
pub const QA_EVIDENCE: &str = "qa.evidence";
/// 1-10 relevance rating of one paper.
pub const SYNTH_RELEVANCE: &str = "synth.relevance";
/// Cross-paper synthesis with inline citations.
pub const SYNTH_COMPOSE: &str = "synth.compose";
/// Structured single-paper summary.
pub const SYNTH_DEEP_DIVE: &str = "synth.deep_dive";

const BUILTIN_SOURCES: &[(&str, &str)] = &[
    (QA_CONFIDENCE, include_str!("../prompts/qa.confidence.yml")),
    (QA_PARAMETRIC, include_str!("../prompts/qa.parametric.yml")),
    (QA_EVIDENCE, include_str!("../prompts/qa.evidence.yml")),
    (SYNTH_RELEVANCE, include_str!("../prompts/synth.relevance.yml")),
    (SYNTH_COMPOSE, include_str!("../prompts/synth.compose.yml")),
    (SYNTH_DEEP_DIVE, include_str!("../prompts/synth.deep_dive.yml")),
];

/// Parse every built-in prompt.
pub fn builtin_definitions() -> AppResult<Vec<PromptDefinition>> {
    BUILTIN_SOURCES
        .iter()
        .map(|(id, source)| parse_prompt(source, &format!("builtin:{}", id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_prompts_parse() {
        let defs = builtin_definitions().unwrap();
        assert_eq!(defs.len(), BUILTIN_SOURCES.len());
    }

    #[test]
    fn test_builtin_ids_match_file_ids() {
        let defs = builtin_definitions().unwrap();
        for ((id, _), def) in BUILTIN_SOURCES.iter().zip(&defs) {
            assert_eq!(*id, def.id);
        }
    }

    #[test]
    fn test_builtin_templates_reference_declared_variables() {
        for def in builtin_definitions().unwrap() {
            for var in &def.input.variables {
                assert!(
                    def.template.contains(&format!("{{{{{}}}}}", var)),
                    "{} does not use {}",
                    def.id,
                    var
                );
            }
        }
    }
}
