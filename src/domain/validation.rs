//! Text rules for a todo's `text` field.
//!
//! Each rule is a standalone function so callers can run them in their own
//! order. `TextRules::validate` runs length, character class and forbidden
//! words in that order and stops at the first failure. Uniqueness depends on
//! the surrounding collection, so it is only checked by the list controller.

use thiserror::Error;

pub const MIN_TEXT_LEN: usize = 3;
pub const MAX_TEXT_LEN: usize = 100;
pub const FORBIDDEN_WORDS: [&str; 3] = ["prohibited", "forbidden", "banned"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Error: The todo text must be between 3 and 100 characters long.")]
    InvalidLength,
    #[error("Error: The todo text can only contain letters, numbers, and spaces.")]
    InvalidCharacters,
    #[error("Error: The todo text cannot include the prohibited word \"{word}\"")]
    ForbiddenWord { word: String },
    #[error("Error: The todo text is already in the collection.")]
    DuplicateText,
}

/// How forbidden words are located inside a candidate text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenWordMatch {
    /// Any occurrence counts, so "unbanned" is rejected.
    Substring,
    /// Only whitespace-separated tokens equal to a forbidden word count.
    WholeWord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRules {
    pub forbidden_match: ForbiddenWordMatch,
}

impl TextRules {
    /// Rules used by `create_todo` and `update_todo_text`.
    pub const SUBSTRING: Self = Self { forbidden_match: ForbiddenWordMatch::Substring };
    /// Rules used by the list controller.
    pub const WHOLE_WORD: Self = Self { forbidden_match: ForbiddenWordMatch::WholeWord };

    pub fn validate(&self, text: &str) -> Result<(), ValidationError> {
        check_length(text)?;
        check_characters(text)?;
        check_forbidden_words(text, self.forbidden_match)
    }
}

impl Default for TextRules {
    fn default() -> Self { Self::SUBSTRING }
}

/// Length is counted in characters. An empty string is the absent case.
pub fn check_length(text: &str) -> Result<(), ValidationError> {
    let len = text.chars().count();
    if len < MIN_TEXT_LEN || len > MAX_TEXT_LEN {
        return Err(ValidationError::InvalidLength);
    }
    Ok(())
}

/// Only ASCII letters, digits and the plain space character are allowed.
pub fn check_characters(text: &str) -> Result<(), ValidationError> {
    if text.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
        Ok(())
    } else {
        Err(ValidationError::InvalidCharacters)
    }
}

pub fn check_forbidden_words(text: &str, mode: ForbiddenWordMatch) -> Result<(), ValidationError> {
    let found = match mode {
        ForbiddenWordMatch::Substring => FORBIDDEN_WORDS.iter().find(|w| text.contains(*w)).copied(),
        ForbiddenWordMatch::WholeWord => text
            .split_whitespace()
            .find_map(|token| FORBIDDEN_WORDS.iter().find(|w| **w == token).copied()),
    };
    match found {
        Some(word) => Err(ValidationError::ForbiddenWord { word: word.to_string() }),
        None => Ok(()),
    }
}

/// Fails when any of `existing` is exactly equal to `text`.
pub fn check_unique<'a, I>(text: &str, existing: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    if existing.into_iter().any(|other| other == text) {
        return Err(ValidationError::DuplicateText);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_bounds_are_inclusive() {
        assert_eq!(check_length(""), Err(ValidationError::InvalidLength));
        assert_eq!(check_length("ab"), Err(ValidationError::InvalidLength));
        assert!(check_length("abc").is_ok());
        assert!(check_length(&"a".repeat(100)).is_ok());
        assert_eq!(check_length(&"a".repeat(101)), Err(ValidationError::InvalidLength));
    }

    #[test]
    fn characters_allow_only_ascii_alnum_and_space() {
        assert!(check_characters("Buy milk 2").is_ok());
        assert_eq!(check_characters("50% off!"), Err(ValidationError::InvalidCharacters));
        assert_eq!(check_characters("tab\there"), Err(ValidationError::InvalidCharacters));
        assert_eq!(check_characters("caf\u{e9}"), Err(ValidationError::InvalidCharacters));
    }

    #[test]
    fn substring_mode_rejects_embedded_words() {
        let err = check_forbidden_words("unbanned task", ForbiddenWordMatch::Substring).unwrap_err();
        assert_eq!(err, ValidationError::ForbiddenWord { word: "banned".into() });
    }

    #[test]
    fn whole_word_mode_only_matches_tokens() {
        assert!(check_forbidden_words("unbanned task", ForbiddenWordMatch::WholeWord).is_ok());
        let err = check_forbidden_words("this is  forbidden", ForbiddenWordMatch::WholeWord).unwrap_err();
        assert_eq!(err.to_string(), "Error: The todo text cannot include the prohibited word \"forbidden\"");
    }

    #[test]
    fn forbidden_words_are_case_sensitive() {
        assert!(check_forbidden_words("Banned list", ForbiddenWordMatch::Substring).is_ok());
    }

    #[test]
    fn first_failing_rule_wins() {
        // too short and bad characters: length is reported
        assert_eq!(TextRules::SUBSTRING.validate("!"), Err(ValidationError::InvalidLength));
        // bad characters and a forbidden word: characters are reported
        assert_eq!(TextRules::SUBSTRING.validate("banned!"), Err(ValidationError::InvalidCharacters));
    }

    #[test]
    fn unique_compares_exact_text() {
        let existing = ["Buy milk", "Walk dog"];
        assert_eq!(check_unique("Buy milk", existing), Err(ValidationError::DuplicateText));
        assert!(check_unique("buy milk", existing).is_ok());
    }
}
