//! The todo list behind a plain method interface.
//!
//! [`TodoStore`] owns the runtime [`Store`] and turns each operation into an
//! action. Nothing here returns an error: invalid input is ignored, storage
//! failures are logged by the reducer's effects, and runtime failures are
//! logged here. The in-memory list is always the best state available.

use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{Filter, Stats, Todo, TodoAction, TodoId, TodoState};
use tasklist_runtime::{Store, StoreConfig};

/// Owner of the in-memory todo list
///
/// Every mutating operation that changes the list saves it before
/// returning.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasklist::storage::{JsonStorage, MemoryStore};
/// use tasklist::{Filter, TodoEnvironment, TodoStore};
///
/// let env = TodoEnvironment::production(Arc::new(JsonStorage::new(MemoryStore::new())));
/// let mut store = TodoStore::open(env);
///
/// let milk = store.add("Buy milk").unwrap();
/// store.add("Walk dog");
/// store.toggle(&milk);
///
/// let texts: Vec<&str> = store.list(Filter::All).map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, ["Walk dog", "Buy milk"]);
/// assert_eq!(store.stats().completed, 1);
/// ```
pub struct TodoStore {
    inner: Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>,
}

impl TodoStore {
    /// Create an empty store; call [`Self::initialize`] to load saved data
    #[must_use]
    pub fn new(env: TodoEnvironment) -> Self {
        Self::with_config(env, StoreConfig::default())
    }

    /// Create an empty store with a custom runtime configuration
    #[must_use]
    pub fn with_config(env: TodoEnvironment, config: StoreConfig) -> Self {
        Self {
            inner: Store::with_config(TodoState::new(), TodoReducer::new(), env, config),
        }
    }

    /// Create a store and load saved data into it
    #[must_use]
    pub fn open(env: TodoEnvironment) -> Self {
        let mut store = Self::new(env);
        store.initialize();
        store
    }

    /// Replace the list with the persisted one
    ///
    /// Missing or unreadable data yields an empty list. The filter is kept.
    pub fn initialize(&mut self) {
        self.dispatch(TodoAction::Initialize);
    }

    /// Add a todo at the front of the list
    ///
    /// Returns the new todo's id, or `None` if `text` was blank.
    pub fn add(&mut self, text: &str) -> Option<TodoId> {
        let before = self.todos().len();
        self.dispatch(TodoAction::AddTodo {
            text: text.to_owned(),
        });

        if self.todos().len() > before {
            self.todos().first().map(|todo| todo.id.clone())
        } else {
            None
        }
    }

    /// Flip a todo's completed flag
    pub fn toggle(&mut self, id: &TodoId) {
        self.dispatch(TodoAction::ToggleTodo { id: id.clone() });
    }

    /// Replace a todo's text; blank text leaves the todo unchanged
    pub fn update(&mut self, id: &TodoId, text: &str) {
        self.dispatch(TodoAction::UpdateTodo {
            id: id.clone(),
            text: text.to_owned(),
        });
    }

    /// Remove a todo
    pub fn delete(&mut self, id: &TodoId) {
        self.dispatch(TodoAction::DeleteTodo { id: id.clone() });
    }

    /// Remove every completed todo; saves even when none were completed
    pub fn clear_completed(&mut self) {
        self.dispatch(TodoAction::ClearCompleted);
    }

    /// Change the view filter
    pub fn set_filter(&mut self, filter: Filter) {
        self.dispatch(TodoAction::SetFilter { filter });
    }

    /// Current view filter
    #[must_use]
    pub fn filter(&self) -> Filter {
        self.state().filter
    }

    /// Todos matching `filter`, in list order
    pub fn list(&self, filter: Filter) -> impl Iterator<Item = &Todo> + '_ {
        self.state().list(filter)
    }

    /// Todos matching the current filter
    pub fn visible(&self) -> impl Iterator<Item = &Todo> + '_ {
        self.state().visible()
    }

    /// Counts over the whole list
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.state().stats()
    }

    /// The whole list, most recent first
    #[must_use]
    pub fn todos(&self) -> &[Todo] {
        &self.state().todos
    }

    /// Look up a todo
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.state().get(id)
    }

    /// The full state
    #[must_use]
    pub fn state(&self) -> &TodoState {
        self.inner.state_ref()
    }

    fn dispatch(&mut self, action: TodoAction) {
        let name = action.name();
        if let Err(error) = self.inner.send(action) {
            tracing::error!(%error, action = name, "Todo action failed");
        }
    }
}

impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore")
            .field("state", self.state())
            .finish_non_exhaustive()
    }
}
