//! Prompt construction for the wellness assistant
//!
//! The assistant sends one composed prompt per question: the system prompt,
//! optional condition context, a window of the recent transcript and the
//! question itself.

pub mod suggestions;
pub mod system_prompt;

pub use suggestions::{quick_remedies_prompt, suggested_questions, BASE_QUESTIONS};
pub use system_prompt::SYSTEM_PROMPT;

use crate::error::{Result, VaidyaError};
use crate::session::{DisplayMessage, Role};
use serde::{Deserialize, Serialize};

/// Health condition the conversation is focused on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

impl Condition {
    /// A condition known only by its title
    pub fn named(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Compose the prompt for one question
///
/// Only the last `window` messages of `history` are included.
///
/// # Examples
///
/// ```
/// use vaidya::prompts::build_prompt;
///
/// let prompt = build_prompt("Is turmeric milk good at night?", &[], None, 5);
/// assert!(prompt.contains("User Question: Is turmeric milk good at night?"));
/// ```
pub fn build_prompt(
    user_message: &str,
    history: &[DisplayMessage],
    condition: Option<&Condition>,
    window: usize,
) -> String {
    let mut prompt = format!("{}\n\n", SYSTEM_PROMPT);

    if let Some(condition) = condition {
        prompt.push_str(&format!(
            "Current Context: The user is inquiring about \"{}\".\n",
            condition.title
        ));
        if !condition.description.is_empty() {
            prompt.push_str(&format!("Description: {}\n", condition.description));
        }
        if !condition.symptoms.is_empty() {
            prompt.push_str(&format!(
                "Common Symptoms: {}\n",
                condition.symptoms.join(", ")
            ));
        }
        prompt.push('\n');
    }

    if !history.is_empty() {
        prompt.push_str("Recent Conversation:\n");
        let start = history.len().saturating_sub(window);
        for message in &history[start..] {
            let speaker = match message.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            prompt.push_str(&format!("{}: {}\n", speaker, message.text));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("User Question: {}\n\n", user_message));
    prompt.push_str("Please provide a helpful, natural healing-focused response:");
    prompt
}

/// Check a question before it is sent anywhere
///
/// # Errors
///
/// Returns `VaidyaError::Validation` if the trimmed text is shorter than
/// `min_chars` or the text as typed is longer than `max_chars`.
pub fn validate_user_input(text: &str, min_chars: usize, max_chars: usize) -> Result<()> {
    let trimmed = text.trim().chars().count();
    let raw = text.chars().count();
    if trimmed < min_chars || raw > max_chars {
        return Err(VaidyaError::Validation(format!(
            "Please enter a valid question ({}-{} characters)",
            min_chars, max_chars
        )));
    }
    Ok(())
}
