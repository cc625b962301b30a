//! Reducer logic for the todo list.
//!
//! Commands are validated against the current state and turned into events.
//! Events are applied unconditionally. Applying an event marked `#[persist]`
//! yields a save effect carrying a snapshot of the full list, which the
//! runtime executes before `send` returns.

use crate::storage::TodoStorage;
use crate::types::{Todo, TodoAction, TodoId, TodoState};
use std::collections::HashSet;
use std::sync::Arc;
use tasklist_core::{
    SmallVec,
    effect::Effect,
    environment::{Clock, IdGenerator, SystemClock},
    reducer::Reducer,
    smallvec,
};
use uuid::Uuid;

/// How many fresh ids to try before giving up on an add
const MAX_ID_ATTEMPTS: usize = 8;

/// Random UUID v4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
    /// Source of new todo ids
    pub ids: Arc<dyn IdGenerator>,
    /// Where the list is persisted
    pub storage: Arc<dyn TodoStorage>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        storage: Arc<dyn TodoStorage>,
    ) -> Self {
        Self {
            clock,
            ids,
            storage,
        }
    }

    /// Wall clock and random ids over `storage`
    #[must_use]
    pub fn production(storage: Arc<dyn TodoStorage>) -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(UuidGenerator), storage)
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies `event` and returns the effects it calls for
    ///
    /// A persisting event saves only when it changed the list.
    fn commit(
        state: &mut TodoState,
        event: TodoAction,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        let persists = event.persists();
        let event_type = event.event_type();
        tracing::debug!(event = event_type, "Applying event");

        if !Self::apply_event(state, event) {
            tracing::debug!(event = event_type, "Event changed nothing");
            return SmallVec::new();
        }

        if persists {
            smallvec![Self::save_effect(state, env)]
        } else {
            SmallVec::new()
        }
    }

    /// Applies an event to state, returning whether it took effect
    fn apply_event(state: &mut TodoState, event: TodoAction) -> bool {
        match event {
            TodoAction::TodosLoaded { todos } => {
                state.todos = Self::sanitize(todos);
                let stats = state.stats();
                tracing::info!(
                    total = stats.total,
                    active = stats.active,
                    completed = stats.completed,
                    "Todos loaded"
                );
                true
            },
            TodoAction::TodoAdded { mut todo } => {
                let trimmed = todo.text.trim();
                if trimmed.is_empty() {
                    tracing::debug!(id = %todo.id, "Ignoring added todo with blank text");
                    return false;
                }
                if state.contains(&todo.id) {
                    tracing::warn!(id = %todo.id, "Ignoring add of a todo whose id is taken");
                    return false;
                }
                if trimmed.len() != todo.text.len() {
                    todo.text = trimmed.to_owned();
                }
                todo.updated_at = todo.updated_at.max(todo.created_at);
                state.todos.insert(0, todo);
                true
            },
            TodoAction::TodoToggled { id, completed, at } => {
                let Some(todo) = state.get_mut(&id) else {
                    return false;
                };
                todo.completed = completed;
                todo.touch(at);
                true
            },
            TodoAction::TodoUpdated { id, text, at } => {
                let text = text.trim();
                if text.is_empty() {
                    tracing::debug!(%id, "Ignoring updated todo with blank text");
                    return false;
                }
                let Some(todo) = state.get_mut(&id) else {
                    return false;
                };
                text.clone_into(&mut todo.text);
                todo.touch(at);
                true
            },
            TodoAction::TodoDeleted { id } => {
                let before = state.len();
                state.todos.retain(|todo| todo.id != id);
                state.len() != before
            },
            // Always rewrites storage, even when nothing was completed
            TodoAction::CompletedCleared { .. } => {
                state.todos.retain(|todo| !todo.completed);
                true
            },
            TodoAction::FilterChanged { filter } => {
                state.filter = filter;
                true
            },
            // Commands are not applied to state
            TodoAction::Initialize
            | TodoAction::AddTodo { .. }
            | TodoAction::ToggleTodo { .. }
            | TodoAction::UpdateTodo { .. }
            | TodoAction::DeleteTodo { .. }
            | TodoAction::ClearCompleted
            | TodoAction::SetFilter { .. } => false,
        }
    }

    /// Saves a snapshot of the current list
    ///
    /// Failures are logged and otherwise ignored; the in-memory list stays
    /// the source of truth for the session.
    fn save_effect(state: &TodoState, env: &TodoEnvironment) -> Effect<TodoAction> {
        let snapshot = state.todos.clone();
        let storage = Arc::clone(&env.storage);

        Effect::run(move || {
            if let Err(error) = storage.save(&snapshot) {
                tracing::warn!(
                    %error,
                    count = snapshot.len(),
                    "Failed to persist todos, keeping in-memory state"
                );
            }
            None
        })
    }

    /// Reads the persisted list and feeds it back as `TodosLoaded`
    fn load_effect(env: &TodoEnvironment) -> Effect<TodoAction> {
        let storage = Arc::clone(&env.storage);
        Effect::run(move || {
            Some(TodoAction::TodosLoaded {
                todos: Self::load_or_empty(storage.as_ref()),
            })
        })
    }

    fn load_or_empty(storage: &dyn TodoStorage) -> Vec<Todo> {
        storage.load().unwrap_or_else(|error| {
            tracing::warn!(%error, "Failed to load persisted todos, starting empty");
            Vec::new()
        })
    }

    /// Enforces the list invariants on data read from storage
    fn sanitize(todos: Vec<Todo>) -> Vec<Todo> {
        let mut seen = HashSet::with_capacity(todos.len());
        let mut clean = Vec::with_capacity(todos.len());

        for mut todo in todos {
            let trimmed = todo.text.trim();
            if trimmed.is_empty() {
                tracing::warn!(id = %todo.id, "Dropping stored todo with blank text");
                continue;
            }
            if trimmed.len() != todo.text.len() {
                todo.text = trimmed.to_owned();
                tracing::warn!(id = %todo.id, "Trimmed stored todo text");
            }
            if !seen.insert(todo.id.clone()) {
                tracing::warn!(id = %todo.id, "Dropping stored todo with duplicate id");
                continue;
            }
            if todo.updated_at < todo.created_at {
                tracing::warn!(
                    id = %todo.id,
                    created_at = %todo.created_at,
                    updated_at = %todo.updated_at,
                    "Stored todo updated before it was created, clamping"
                );
                todo.updated_at = todo.created_at;
            }
            clean.push(todo);
        }

        clean
    }

    /// Draws ids until one is free
    fn fresh_id(state: &TodoState, env: &TodoEnvironment) -> Option<TodoId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = TodoId::from(env.ids.next_id());
            if !state.contains(&id) {
                return Some(id);
            }
            tracing::warn!(%id, "Generated todo id already in use, retrying");
        }
        None
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            TodoAction::Initialize => smallvec![Self::load_effect(env)],

            TodoAction::AddTodo { text } => {
                let text = text.trim();
                if text.is_empty() {
                    tracing::debug!("Ignoring add with blank text");
                    return SmallVec::new();
                }
                let Some(id) = Self::fresh_id(state, env) else {
                    tracing::error!(
                        attempts = MAX_ID_ATTEMPTS,
                        "Could not generate an unused todo id"
                    );
                    return SmallVec::new();
                };

                let todo = Todo::new(id, text, env.clock.now());
                Self::commit(state, TodoAction::TodoAdded { todo }, env)
            },

            TodoAction::ToggleTodo { id } => {
                let Some(todo) = state.get(&id) else {
                    tracing::debug!(%id, "Ignoring toggle of unknown todo");
                    return SmallVec::new();
                };

                let event = TodoAction::TodoToggled {
                    completed: !todo.completed,
                    id,
                    at: env.clock.now(),
                };
                Self::commit(state, event, env)
            },

            TodoAction::UpdateTodo { id, text } => {
                let text = text.trim();
                if text.is_empty() {
                    tracing::debug!(%id, "Ignoring update with blank text");
                    return SmallVec::new();
                }
                if !state.contains(&id) {
                    tracing::debug!(%id, "Ignoring update of unknown todo");
                    return SmallVec::new();
                }

                let event = TodoAction::TodoUpdated {
                    id,
                    text: text.to_owned(),
                    at: env.clock.now(),
                };
                Self::commit(state, event, env)
            },

            TodoAction::DeleteTodo { id } => {
                if !state.contains(&id) {
                    tracing::debug!(%id, "Ignoring delete of unknown todo");
                    return SmallVec::new();
                }
                Self::commit(state, TodoAction::TodoDeleted { id }, env)
            },

            TodoAction::ClearCompleted => {
                let removed = state.completed_count();
                Self::commit(state, TodoAction::CompletedCleared { removed }, env)
            },

            TodoAction::SetFilter { filter } => {
                Self::commit(state, TodoAction::FilterChanged { filter }, env)
            },

            // ========== Events ==========
            event @ (TodoAction::TodosLoaded { .. }
            | TodoAction::TodoAdded { .. }
            | TodoAction::TodoToggled { .. }
            | TodoAction::TodoUpdated { .. }
            | TodoAction::TodoDeleted { .. }
            | TodoAction::CompletedCleared { .. }
            | TodoAction::FilterChanged { .. }) => Self::commit(state, event, env),
        }
    }
}
