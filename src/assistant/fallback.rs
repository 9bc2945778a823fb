/*!
 * Last-resort replies.
 */

use crate::errors::AssistantError;
use crate::language::{Language, Localized, ALL_LANGUAGES};

/// Picks a fallback message by the length of the user's message, so the
/// same question always gets the same reply.
#[derive(Debug, Clone)]
pub struct FallbackRotator {
    messages: Localized<Vec<String>>,
}

impl FallbackRotator {
    /// Every language needs at least one message
    pub fn new(messages: Localized<Vec<String>>) -> Result<Self, AssistantError> {
        if let Some(language) = ALL_LANGUAGES.into_iter().find(|l| messages.get(*l).is_empty()) {
            return Err(AssistantError::Config(format!(
                "No fallback messages configured for {}",
                language.name()
            )));
        }
        Ok(Self { messages })
    }

    /// `messages[char_count % len]`
    pub fn select(&self, user_message: &str, language: Language) -> &str {
        let messages = self.messages.get(language);
        let index = user_message.chars().count() % messages.len();
        messages[index].as_str()
    }
}
