//! Sending rendered prompts to the text-generation collaborator.

use crate::cancel::cancellable;
use pubmed_core::AppResult;
use pubmed_llm::{LlmClient, LlmRequest};
use pubmed_prompt::BuiltPrompt;
use tokio_util::sync::CancellationToken;

/// Approximate token count for `text`: one token per four bytes.
pub fn approx_tokens(text: &str) -> usize {
    text.len() / 4
}

/// Complete `prompt`, honouring `cancel`.
///
/// `max_tokens` overrides the limit declared by the prompt definition.
pub async fn generate(
    llm: &dyn LlmClient,
    model: &str,
    prompt: &BuiltPrompt,
    max_tokens: Option<u32>,
    cancel: &CancellationToken,
    stage: &str,
) -> AppResult<String> {
    let mut request = LlmRequest::new(prompt.user.clone(), model);
    if let Some(limit) = max_tokens.or(prompt.max_tokens) {
        request = request.with_max_tokens(limit);
    }
    if let Some(temperature) = prompt.temperature {
        request = request.with_temperature(temperature);
    }

    tracing::trace!(
        stage,
        prompt_id = %prompt.metadata.source_prompt_id,
        prompt = %prompt.user,
        "Sending prompt"
    );

    let response = cancellable(cancel, stage, llm.complete(&request)).await?;

    tracing::debug!(
        stage,
        provider = llm.provider_name(),
        chars = response.content.len(),
        "Received completion"
    );
    Ok(response.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_tokens() {
        assert_eq!(approx_tokens(""), 0);
        assert_eq!(approx_tokens("abcd"), 1);
        assert_eq!(approx_tokens(&"x".repeat(401)), 100);
    }
}
