//! Prompt validation shared by every submission entry point.

/// Maximum length of a generation prompt.
const MAX_PROMPT_LEN: usize = 255;

/// A prompt that violates the submission rules. The message names the
/// rule and is surfaced verbatim to the submitter.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct InvalidPrompt(String);

/// Validate a generation prompt.
///
/// Rules:
/// - Must not be empty or whitespace-only.
/// - Must not exceed `MAX_PROMPT_LEN` characters.
pub fn validate_prompt(prompt: &str) -> Result<(), InvalidPrompt> {
    if prompt.trim().is_empty() {
        return Err(InvalidPrompt("Prompt must not be empty".to_string()));
    }
    if prompt.chars().count() > MAX_PROMPT_LEN {
        return Err(InvalidPrompt(format!(
            "Prompt must not exceed {MAX_PROMPT_LEN} characters"
        )));
    }
    Ok(())
}
