use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{TextRules, ValidationError};

/// Opaque identifier. Ids we mint are UUID v4 strings, but ids coming back
/// from the store are kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TodoId(pub String);

impl TodoId {
    pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl Default for TodoId {
    fn default() -> Self { Self::generate() }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self { Self(value.to_string()) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Partial update body; absent fields are left alone by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Validates `text` with substring forbidden-word matching and builds a new,
/// incomplete todo with a fresh id.
pub fn create_todo(text: &str) -> Result<Todo, ValidationError> {
    create_todo_with(&TextRules::SUBSTRING, text)
}

/// Validates `text` and returns a copy of `todo` carrying it. Id and
/// completion are preserved.
pub fn update_todo_text(todo: &Todo, text: &str) -> Result<Todo, ValidationError> {
    update_todo_text_with(&TextRules::SUBSTRING, todo, text)
}

pub fn create_todo_with(rules: &TextRules, text: &str) -> Result<Todo, ValidationError> {
    rules.validate(text)?;
    Ok(Todo { id: TodoId::generate(), text: text.to_string(), completed: false })
}

pub fn update_todo_text_with(rules: &TextRules, todo: &Todo, text: &str) -> Result<Todo, ValidationError> {
    rules.validate(text)?;
    Ok(Todo { text: text.to_string(), ..todo.clone() })
}
