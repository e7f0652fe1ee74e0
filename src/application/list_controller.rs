//! Working copy of the todo collection plus the view-facing state around it.
//!
//! Every mutation follows the same cycle: validate, call the store, apply the
//! store's answer to [`TodoListState`], then notify listeners. Nothing local
//! changes before the store call succeeds.
//!
//! Indices always address the unfiltered `items` list. Views showing a
//! filtered list map rows back with [`TodoListState::filtered_indices`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{
    store::TodoStore,
    todo::{create_todo_with, update_todo_text_with, Todo, TodoId, TodoPatch},
    validation::{check_unique, TextRules, ValidationError},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl Filter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => todo.completed,
            Filter::Incomplete => !todo.completed,
        }
    }

    /// Cycle order used by the terminal view's filter key.
    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Incomplete,
            Filter::Incomplete => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Completed => "completed",
            Filter::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter `{0}` (expected all, completed or incomplete)")]
pub struct ParseFilterError(pub String);

impl FromStr for Filter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "completed" => Ok(Filter::Completed),
            "incomplete" => Ok(Filter::Incomplete),
            other => Err(ParseFilterError(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Error: the todo store request failed: {0:#}")]
    NetworkFailure(anyhow::Error),
    #[error("no todo at index {index} (list has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("todo at index {index} is not being edited")]
    NotEditing { index: usize },
}

/// Plain value holding everything a view needs to render the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListState {
    pub items: Vec<Todo>,
    pub filter: Filter,
    pub completed_count: usize,
    /// Draft text per item being edited. An item is in edit mode iff it has an entry.
    pub drafts: HashMap<TodoId, String>,
    /// Text typed for the next new todo.
    pub input: String,
}

impl TodoListState {
    pub fn with_items(items: Vec<Todo>) -> Self {
        let mut state = Self::default();
        state.replace_items(items);
        state
    }

    pub fn filtered_view(&self) -> Vec<&Todo> {
        self.items.iter().filter(|t| self.filter.matches(t)).collect()
    }

    /// Unfiltered indices of the items `filtered_view` returns, in the same order.
    pub fn filtered_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, t)| self.filter.matches(t))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_editing(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(|t| self.drafts.contains_key(&t.id))
    }

    pub fn draft(&self, index: usize) -> Option<&str> {
        self.items.get(index).and_then(|t| self.drafts.get(&t.id)).map(String::as_str)
    }

    fn replace_items(&mut self, items: Vec<Todo>) {
        self.completed_count = items.iter().filter(|t| t.completed).count();
        self.items = items;
        self.drafts.clear();
    }

    fn replace_at(&mut self, index: usize, todo: Todo) {
        let was_completed = self.items[index].completed;
        match (was_completed, todo.completed) {
            (false, true) => self.completed_count += 1,
            (true, false) => self.completed_count = self.completed_count.saturating_sub(1),
            _ => {}
        }
        self.items[index] = todo;
    }
}

pub type Listener = Box<dyn Fn(&TodoListState) + Send + Sync>;

pub struct ListController<S: TodoStore> {
    store: S,
    rules: TextRules,
    state: TodoListState,
    listeners: Vec<Listener>,
}

impl<S: TodoStore> ListController<S> {
    /// Controller with whole-word forbidden-word matching.
    pub fn new(store: S) -> Self { Self::with_rules(store, TextRules::WHOLE_WORD) }

    pub fn with_rules(store: S, rules: TextRules) -> Self {
        Self { store, rules, state: TodoListState::default(), listeners: Vec::new() }
    }

    /// Seeds the controller with an existing state instead of loading from the store.
    pub fn with_state(mut self, state: TodoListState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &TodoListState { &self.state }
    pub fn items(&self) -> &[Todo] { &self.state.items }
    pub fn filter(&self) -> Filter { self.state.filter }
    pub fn completed_count(&self) -> usize { self.state.completed_count }
    pub fn input(&self) -> &str { &self.state.input }
    pub fn is_editing(&self, index: usize) -> bool { self.state.is_editing(index) }
    pub fn draft(&self, index: usize) -> Option<&str> { self.state.draft(index) }
    pub fn filtered_view(&self) -> Vec<&Todo> { self.state.filtered_view() }

    /// Called with the new state after every applied mutation.
    pub fn subscribe(&mut self, listener: impl Fn(&TodoListState) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Loads the whole collection. On failure the current items are kept.
    pub async fn initialize(&mut self) -> Result<(), ControllerError> {
        let items = self.store.list().await.map_err(|e| network_failure("list", e))?;
        info!(count = items.len(), "loaded todos");
        self.state.replace_items(items);
        self.notify();
        Ok(())
    }

    pub async fn add(&mut self, text: &str) -> Result<(), ControllerError> {
        let todo = create_todo_with(&self.rules, text)
            .and_then(|todo| {
                check_unique(text, self.state.items.iter().map(|t| t.text.as_str()))?;
                Ok(todo)
            })
            .inspect_err(|err| debug!(%err, "rejected new todo"))?;

        let created = self.store.create(&todo).await.map_err(|e| network_failure("create", e))?;
        info!(id = %created.id, "created todo");
        if created.completed {
            self.state.completed_count += 1;
        }
        self.state.items.push(created);
        self.state.input.clear();
        self.notify();
        Ok(())
    }

    /// Adds whatever is in the input buffer. The buffer is kept on failure.
    pub async fn submit_input(&mut self) -> Result<(), ControllerError> {
        let text = self.state.input.clone();
        self.add(&text).await
    }

    /// Replaces the text of `items[index]`. The duplicate check ignores the
    /// edited item itself, so saving an unchanged text is allowed.
    pub async fn update(&mut self, index: usize, new_text: &str) -> Result<(), ControllerError> {
        let current = self.item(index)?.clone();
        let candidate = update_todo_text_with(&self.rules, &current, new_text)
            .and_then(|candidate| {
                let others = self
                    .state
                    .items
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != index)
                    .map(|(_, t)| t.text.as_str());
                check_unique(new_text, others)?;
                Ok(candidate)
            })
            .inspect_err(|err| debug!(%err, index, "rejected todo update"))?;

        let patch = TodoPatch { text: Some(candidate.text), completed: Some(candidate.completed) };
        let saved = self.store.update(&current.id, patch).await.map_err(|e| network_failure("update", e))?;
        info!(id = %saved.id, "updated todo text");
        self.state.replace_at(index, saved);
        self.state.drafts.remove(&current.id);
        self.notify();
        Ok(())
    }

    /// Saves the draft of an item in edit mode.
    pub async fn commit_edit(&mut self, index: usize) -> Result<(), ControllerError> {
        let draft = self.draft(index).map(str::to_string).ok_or(ControllerError::NotEditing { index })?;
        self.update(index, &draft).await
    }

    pub async fn remove(&mut self, index: usize) -> Result<(), ControllerError> {
        let id = self.item(index)?.id.clone();
        self.store.delete(&id).await.map_err(|e| network_failure("delete", e))?;
        let removed = self.state.items.remove(index);
        if removed.completed {
            self.state.completed_count = self.state.completed_count.saturating_sub(1);
        }
        self.state.drafts.remove(&removed.id);
        info!(id = %removed.id, "deleted todo");
        self.notify();
        Ok(())
    }

    pub async fn toggle_complete(&mut self, index: usize) -> Result<(), ControllerError> {
        let current = self.item(index)?;
        let id = current.id.clone();
        let patch = TodoPatch { text: None, completed: Some(!current.completed) };
        let saved = self.store.update(&id, patch).await.map_err(|e| network_failure("toggle", e))?;
        info!(id = %saved.id, completed = saved.completed, "toggled todo");
        self.state.replace_at(index, saved);
        self.notify();
        Ok(())
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.state.filter = filter;
        self.notify();
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.state.input = text.into();
        self.notify();
    }

    pub fn begin_edit(&mut self, index: usize, initial_text: impl Into<String>) -> Result<(), ControllerError> {
        let id = self.item(index)?.id.clone();
        self.state.drafts.insert(id, initial_text.into());
        self.notify();
        Ok(())
    }

    pub fn set_draft(&mut self, index: usize, text: impl Into<String>) -> Result<(), ControllerError> {
        let id = self.item(index)?.id.clone();
        let draft = self.state.drafts.get_mut(&id).ok_or(ControllerError::NotEditing { index })?;
        *draft = text.into();
        self.notify();
        Ok(())
    }

    /// Leaves edit mode without saving. Ending an edit that never began is a no-op.
    pub fn end_edit(&mut self, index: usize) -> Result<(), ControllerError> {
        let id = self.item(index)?.id.clone();
        if self.state.drafts.remove(&id).is_some() {
            self.notify();
        }
        Ok(())
    }

    fn item(&self, index: usize) -> Result<&Todo, ControllerError> {
        let len = self.state.items.len();
        self.state.items.get(index).ok_or(ControllerError::IndexOutOfRange { index, len })
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.state);
        }
    }
}

fn network_failure(operation: &'static str, err: anyhow::Error) -> ControllerError {
    warn!(operation, error = %format!("{err:#}"), "todo store call failed");
    ControllerError::NetworkFailure(err)
}
