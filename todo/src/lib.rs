//! Client-side todo list with best-effort local persistence.
//!
//! Users create, edit, complete, delete, filter, and bulk-clear short text
//! items. The list lives in memory and is saved in full after every change;
//! a failed save is logged and the session carries on with the in-memory
//! list.
//!
//! - [`types`]: `Todo`, `Filter`, `Stats`, state and actions
//! - [`reducer`]: validation and event application
//! - [`storage`]: blob stores and JSON list persistence
//! - [`store`]: [`TodoStore`], the method interface a UI talks to
//! - [`config`]: environment-driven settings for the binary
//!
//! # Quick Start
//!
//! ```no_run
//! use tasklist::{Config, Filter, TodoStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let mut store = TodoStore::open(config.environment()?);
//!
//! if let Some(id) = store.add("Buy milk") {
//!     store.toggle(&id);
//! }
//!
//! for todo in store.list(Filter::Active) {
//!     println!("[ ] {}", todo.text);
//! }
//! println!("{}% done", store.stats().completion_percentage);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod reducer;
pub mod storage;
pub mod store;
pub mod timestamp;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use reducer::{TodoEnvironment, TodoReducer, UuidGenerator};
pub use storage::{StorageError, TodoStorage};
pub use store::TodoStore;
pub use types::{Filter, ParseFilterError, Stats, Todo, TodoAction, TodoId, TodoState};
