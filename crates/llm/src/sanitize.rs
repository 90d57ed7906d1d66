//! Coarse input filter for user questions before they reach a prompt.
//!
//! This is a best-effort screen, not a prompt-injection defense: it trims and
//! normalises the text, enforces length bounds and rejects a small table of
//! well-known injection phrasings. Every rejection is logged at `warn` with
//! the reason tag only, never the text.

use pubmed_core::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Minimum accepted prompt length in characters.
pub const MIN_PROMPT_LENGTH: usize = 5;

/// Default maximum prompt length in characters.
pub const MAX_PROMPT_LENGTH: usize = 10_000;

/// Tagged injection phrasings. Extend the table, not the control flow.
const INJECTION_PATTERNS: &[(&str, &str)] = &[
    (
        "ignore_previous",
        r"(?i)ignore\s+(all\s+)?(previous|prior|above)\s+(instructions?|prompts?|context)",
    ),
    ("disregard_previous", r"(?i)disregard\s+(all\s+)?(previous|prior|above)"),
    (
        "forget_context",
        r"(?i)forget\s+(everything|all|what)\s+(you|i)\s+(told|said)",
    ),
    ("new_instructions", r"(?i)new\s+instructions?:"),
    ("system_role", r"(?i)system\s*:\s*you\s+are"),
    ("role_reassignment", r"(?i)you\s+are\s+now\s+(a|an|my)\b"),
    ("pretend", r"(?i)pretend\s+(you\s+are|to\s+be)\s+(a|an)\b"),
    ("act_as", r"(?i)act\s+as\s+(if|though|a|an)\b"),
    ("override", r"(?i)override\s+(previous|system|safety)"),
    ("bracket_directive", r"(?i)\[\[.*?(system|admin|root).*?\]\]"),
    ("special_token", r"(?i)<\|?(system|endoftext|im_start|im_end)\|?>"),
    ("jailbreak", r"(?i)jailbreak"),
];

static INJECTION_TABLE: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    INJECTION_PATTERNS
        .iter()
        .filter_map(|(tag, pattern)| Regex::new(pattern).ok().map(|re| (*tag, re)))
        .collect()
});

static SHELL_METACHARS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[;|&$`]|\$\(|\)\s*[|&;]").ok());

static URL_HOST: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"https?://([^/\s]+)").ok());

/// Knobs for [`sanitize_prompt`].
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Maximum length in characters
    pub max_prompt_length: usize,
    /// Accept `; | & $ \`` and friends
    pub allow_shell_metachars: bool,
    /// Reject text matching the injection table
    pub block_prompt_injection: bool,
    /// If non-empty, every URL host must equal or be a subdomain of one of these
    pub allowed_domains: Vec<String>,
}

impl Default for SecurityConfig {
    /// Questions travel over HTTP, never through a shell, so metacharacters
    /// such as "&" in "Smith & Jones" are accepted.
    fn default() -> Self {
        Self {
            max_prompt_length: MAX_PROMPT_LENGTH,
            allow_shell_metachars: true,
            block_prompt_injection: true,
            allowed_domains: Vec::new(),
        }
    }
}

impl SecurityConfig {
    /// Defaults plus shell metacharacter blocking.
    pub fn strict() -> Self {
        Self {
            allow_shell_metachars: false,
            ..Self::default()
        }
    }
}

/// Clean and screen `prompt`, returning the normalised text.
///
/// # Errors
/// `AppError::InvalidInput` naming the rejection reason.
pub fn sanitize_prompt(prompt: &str, config: &SecurityConfig) -> AppResult<String> {
    let cleaned: String = prompt
        .trim()
        .chars()
        .filter(|c| matches!(c, ' ' | '\t' | '\n' | '\r') || !c.is_control())
        .nfc()
        .collect();

    let length = cleaned.chars().count();
    if length < MIN_PROMPT_LENGTH {
        return Err(reject(
            "too_short",
            format!("prompt too short (minimum {} characters)", MIN_PROMPT_LENGTH),
        ));
    }

    let max_length = if config.max_prompt_length == 0 {
        MAX_PROMPT_LENGTH
    } else {
        config.max_prompt_length
    };
    if length > max_length {
        return Err(reject(
            "length_exceeded",
            format!("prompt too long ({} > {} characters)", length, max_length),
        ));
    }

    if !config.allow_shell_metachars
        && SHELL_METACHARS
            .as_ref()
            .is_some_and(|re| re.is_match(&cleaned))
    {
        return Err(reject(
            "shell_metachars",
            "prompt contains unsafe content: shell metacharacters detected".to_string(),
        ));
    }

    if config.block_prompt_injection {
        if let Some(tag) = injection_tag(&cleaned) {
            return Err(reject(
                tag,
                "prompt contains unsafe content: injection pattern detected".to_string(),
            ));
        }
    }

    if !config.allowed_domains.is_empty() {
        if let Some(domain) = disallowed_domain(&cleaned, &config.allowed_domains) {
            return Err(reject(
                "disallowed_url",
                format!("prompt contains disallowed URL: {}", domain),
            ));
        }
    }

    Ok(cleaned)
}

/// Tag of the first injection pattern matching `text`.
pub fn injection_tag(text: &str) -> Option<&'static str> {
    INJECTION_TABLE
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(tag, _)| *tag)
}

fn disallowed_domain(text: &str, allowed: &[String]) -> Option<String> {
    let re = URL_HOST.as_ref()?;
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .find(|host| {
            !allowed.iter().any(|d| {
                let d = d.to_lowercase();
                *host == d || host.ends_with(&format!(".{}", d))
            })
        })
}

fn reject(reason: &str, message: String) -> AppError {
    tracing::warn!(reason, "Prompt rejected");
    AppError::InvalidInput(message)
}
