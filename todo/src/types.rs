//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of short text items, newest first.
//! Items are created, toggled, edited, deleted, and bulk-cleared once
//! completed. The view filter lives next to the list but is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tasklist_macros::Action;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a todo item
///
/// Opaque: ids created here are UUID v4 strings, but any string read back
/// from storage is accepted as-is.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Creates a new random `TodoId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for TodoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single todo item
///
/// Serialized with the field names `id`, `text`, `completed`, `createdAt`
/// and `updatedAt`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier, immutable
    pub id: TodoId,
    /// Trimmed, non-empty description
    pub text: String,
    /// Whether the todo is done
    pub completed: bool,
    /// When the todo was created, immutable
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    /// When `text` or `completed` last changed
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Creates an active todo with both timestamps set to `created_at`
    ///
    /// `text` is stored as given; callers are expected to have trimmed it.
    #[must_use]
    pub fn new(id: TodoId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at,
            updated_at: created_at,
        }
    }

    /// Moves `updated_at` forward to `at`
    ///
    /// Never moves it backwards, so a clock that steps back cannot break
    /// `updated_at >= created_at` or make edits look older than they are.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(at);
    }
}

/// Which todos a view shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every todo
    #[default]
    All,
    /// Todos not yet completed
    Active,
    /// Completed todos
    Completed,
}

impl Filter {
    /// All filters, in tab order
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Returns true if `todo` belongs in this view
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }

    /// Lowercase name, as used in serialized form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown filter name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown filter {0:?}, expected one of: all, active, completed")]
pub struct ParseFilterError(String);

impl FromStr for Filter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFilterError(s.to_owned()))
    }
}

/// Counts derived from the current list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of todos
    pub total: usize,
    /// Todos not yet completed
    pub active: usize,
    /// Completed todos
    pub completed: usize,
    /// `completed / total` as a whole percentage, rounded half up; 0 when empty
    pub completion_percentage: u8,
}

impl Stats {
    /// Computes stats over `todos`
    #[must_use]
    pub fn from_todos<'a>(todos: impl IntoIterator<Item = &'a Todo>) -> Self {
        let (total, completed) = todos
            .into_iter()
            .fold((0usize, 0usize), |(total, completed), todo| {
                (total + 1, completed + usize::from(todo.completed))
            });

        Self {
            total,
            active: total - completed,
            completed,
            completion_percentage: percentage(completed, total),
        }
    }

    /// Number of todos a view with `filter` would show
    #[must_use]
    pub const fn count_for(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.total,
            Filter::Active => self.active,
            Filter::Completed => self.completed,
        }
    }

    /// Returns true if there is at least one todo and every todo is done
    #[must_use]
    pub const fn is_all_done(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

// Integer form of round(part / whole * 100) with halves rounded up.
#[allow(clippy::cast_possible_truncation)] // part <= whole keeps the result <= 100
fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    ((part * 200 + whole) / (whole * 2)) as u8
}

/// State of the todo list
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    /// All todos, most recently created first
    pub todos: Vec<Todo>,
    /// Current view filter, never persisted
    #[serde(skip)]
    pub filter: Filter,
}

impl TodoState {
    /// Creates a new empty todo state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of todos
    #[must_use]
    pub fn len(&self) -> usize {
        self.todos.len()
    }

    /// Returns true if there are no todos
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| &t.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| &t.id == id)
    }

    /// Position of a todo in list order
    #[must_use]
    pub fn position(&self, id: &TodoId) -> Option<usize> {
        self.todos.iter().position(|t| &t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn contains(&self, id: &TodoId) -> bool {
        self.position(id).is_some()
    }

    /// Todos matching `filter`, in list order
    ///
    /// Lazy and recomputed on every call.
    pub fn list(&self, filter: Filter) -> impl Iterator<Item = &Todo> + '_ {
        self.todos.iter().filter(move |todo| filter.matches(todo))
    }

    /// Todos matching the current filter
    pub fn visible(&self) -> impl Iterator<Item = &Todo> + '_ {
        self.list(self.filter)
    }

    /// Derived counts over the whole list
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats::from_todos(&self.todos)
    }
}

/// Actions representing commands and events for the todo list
///
/// Commands are user intents and may be rejected. Events describe a change
/// that happened; the reducer applies them unconditionally, and events marked
/// `#[persist]` are followed by a save of the full list.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: Load the persisted list, replacing the in-memory one
    #[command]
    Initialize,

    /// Command: Create a todo from user input
    #[command]
    AddTodo {
        /// Raw input, trimmed by the reducer
        text: String,
    },

    /// Command: Flip a todo's completed flag
    #[command]
    ToggleTodo {
        /// Todo to toggle
        id: TodoId,
    },

    /// Command: Replace a todo's text
    #[command]
    UpdateTodo {
        /// Todo to edit
        id: TodoId,
        /// Raw input, trimmed by the reducer
        text: String,
    },

    /// Command: Remove a todo
    #[command]
    DeleteTodo {
        /// Todo to remove
        id: TodoId,
    },

    /// Command: Remove every completed todo
    #[command]
    ClearCompleted,

    /// Command: Change the view filter
    #[command]
    SetFilter {
        /// New filter
        filter: Filter,
    },

    // ========== Events ==========
    /// Event: The persisted list was read
    #[event]
    TodosLoaded {
        /// Todos as stored, before sanitizing
        todos: Vec<Todo>,
    },

    /// Event: A todo was created
    #[event]
    #[persist]
    TodoAdded {
        /// The new todo
        todo: Todo,
    },

    /// Event: A todo's completed flag changed
    #[event]
    #[persist]
    TodoToggled {
        /// Todo identifier
        id: TodoId,
        /// New value of the flag
        completed: bool,
        /// When the change happened
        at: DateTime<Utc>,
    },

    /// Event: A todo's text changed
    #[event]
    #[persist]
    TodoUpdated {
        /// Todo identifier
        id: TodoId,
        /// New, trimmed text
        text: String,
        /// When the change happened
        at: DateTime<Utc>,
    },

    /// Event: A todo was removed
    #[event]
    #[persist]
    TodoDeleted {
        /// Todo identifier
        id: TodoId,
    },

    /// Event: Completed todos were removed
    #[event]
    #[persist]
    CompletedCleared {
        /// How many were removed, possibly zero
        removed: usize,
    },

    /// Event: The view filter changed
    #[event]
    FilterChanged {
        /// New filter
        filter: Filter,
    },
}
