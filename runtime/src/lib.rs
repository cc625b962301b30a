//! # Tasklist Runtime
//!
//! Runtime implementation for the tasklist reducer architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, reducer and environment; the only mutator of state
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to the reducer
//! - **Feedback Queue**: Drains the action → reducer → effects → action loop before `send` returns
//!
//! Everything runs on the caller's thread. When [`Store::send`] returns, the
//! state change and every effect it triggered (including storage writes) have
//! completed.
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_runtime::Store;
//!
//! let mut store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//! ```

use std::collections::VecDeque;
use tasklist_core::{effect::Effect, reducer::Reducer};

pub use error::StoreError;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Effects kept producing actions past the configured limit
        ///
        /// State changes made before the limit was hit are kept; the
        /// remaining queued actions are dropped.
        #[error("Feedback limit exceeded: more than {limit} actions fed back from a single send")]
        FeedbackLimitExceeded {
            /// The configured `max_feedback_actions`
            limit: usize,
        },
    }
}

/// Configuration for Store behavior
///
/// # Example
///
/// ```
/// use tasklist_runtime::StoreConfig;
///
/// let config = StoreConfig::default().with_max_feedback_actions(8);
/// assert_eq!(config.max_feedback_actions, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of actions effects may feed back for one `send`
    pub max_feedback_actions: usize,
}

impl StoreConfig {
    /// Default value of [`StoreConfig::max_feedback_actions`]
    pub const DEFAULT_MAX_FEEDBACK_ACTIONS: usize = 64;

    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(max_feedback_actions: usize) -> Self {
        Self {
            max_feedback_actions,
        }
    }

    /// Set the feedback limit
    #[must_use]
    pub const fn with_max_feedback_actions(mut self, limit: usize) -> Self {
        self.max_feedback_actions = limit;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_FEEDBACK_ACTIONS)
    }
}

/// The Store - runtime for a reducer
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
///
/// # Example
///
/// ```ignore
/// let mut store = Store::new(
///     TodoState::default(),
///     TodoReducer::new(),
///     production_environment(),
/// );
///
/// store.send(TodoAction::AddTodo { text: "Buy milk".into() })?;
/// ```
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: S,
    reducer: R,
    environment: E,
    config: StoreConfig,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// Uses [`StoreConfig::default`].
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_config(initial_state, reducer, environment, StoreConfig::default())
    }

    /// Create a new store with a custom configuration
    #[must_use]
    pub const fn with_config(
        initial_state: S,
        reducer: R,
        environment: E,
        config: StoreConfig,
    ) -> Self {
        Self {
            state: initial_state,
            reducer,
            environment,
            config,
        }
    }

    /// Send an action through the reducer and run its effects
    ///
    /// Actions produced by effects are queued and reduced in FIFO order
    /// before this method returns.
    ///
    /// # Returns
    ///
    /// The number of actions reduced (the sent action plus any fed back).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::FeedbackLimitExceeded`] if effects feed back more
    /// than `max_feedback_actions` actions.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub fn send(&mut self, action: A) -> Result<usize, StoreError> {
        tracing::debug!("Processing action");
        metrics::counter!("store.actions.total").increment(1);

        let mut queue = VecDeque::from([action]);
        let mut reduced = 0usize;

        while let Some(action) = queue.pop_front() {
            if reduced > self.config.max_feedback_actions {
                let limit = self.config.max_feedback_actions;
                tracing::error!(
                    limit,
                    dropped = queue.len() + 1,
                    "Feedback limit exceeded, dropping queued actions"
                );
                metrics::counter!("store.feedback.limit_exceeded").increment(1);
                return Err(StoreError::FeedbackLimitExceeded { limit });
            }

            let effects = {
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self
                    .reducer
                    .reduce(&mut self.state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };
            reduced += 1;

            for effect in effects {
                Self::execute_effect(effect, &mut queue);
            }
        }

        tracing::debug!(reduced, "Action processing completed");
        Ok(reduced)
    }

    /// Execute one effect, pushing any produced action onto `queue`
    fn execute_effect(effect: Effect<A>, queue: &mut VecDeque<A>) {
        match effect {
            Effect::None => {
                tracing::trace!("Executing Effect::None (no-op)");
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            },
            Effect::Run(run) => {
                tracing::trace!("Executing Effect::Run");
                metrics::counter!("store.effects.executed", "type" => "run").increment(1);
                if let Some(action) = run() {
                    tracing::trace!("Effect::Run produced an action, queueing it");
                    queue.push_back(action);
                }
            },
            Effect::Parallel(effects) => {
                tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                for effect in effects {
                    Self::execute_effect(effect, queue);
                }
            },
            Effect::Sequential(effects) => {
                tracing::trace!("Executing Effect::Sequential with {} effects", effects.len());
                metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);
                for effect in effects {
                    Self::execute_effect(effect, queue);
                }
            },
        }
    }

    /// Read current state via a closure
    ///
    /// ```ignore
    /// let count = store.state(|s| s.todos.len());
    /// ```
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&self.state)
    }

    /// Borrow the current state
    #[must_use]
    pub const fn state_ref(&self) -> &S {
        &self.state
    }

    /// Borrow the injected environment
    #[must_use]
    pub const fn environment(&self) -> &E {
        &self.environment
    }

    /// Current configuration
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Consume the store, returning its state
    #[must_use]
    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S, A, E, R> std::fmt::Debug for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
