//! Integration tests for `TodoStore` over real storage backends
//!
//! These drive the public method interface end to end: reducer, runtime,
//! save effects and the blob stores underneath.

#![allow(clippy::unwrap_used)] // Test code unwraps freely

use chrono::Duration;
use std::sync::Arc;
use tasklist::storage::{
    DEFAULT_STORAGE_KEY, FileStore, JsonStorage, KeyValueStore, MemoryStore, TodoStorage,
};
use tasklist::{Config, Filter, Stats, TodoEnvironment, TodoId, TodoStore};
use tasklist_testing::helpers::init_tracing;
use tasklist_testing::{SequentialIdGenerator, StepClock, test_clock, test_epoch};

fn memory_store(backend: &MemoryStore) -> TodoStore {
    TodoStore::open(TodoEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(SequentialIdGenerator::default()),
        Arc::new(JsonStorage::new(backend.clone())),
    ))
}

fn texts(store: &TodoStore, filter: Filter) -> Vec<String> {
    store.list(filter).map(|todo| todo.text.clone()).collect()
}

#[test]
fn test_add_toggle_clear_scenario() {
    init_tracing();
    let mut store = memory_store(&MemoryStore::new());
    assert!(store.todos().is_empty());

    let milk = store.add("Buy milk").unwrap();
    store.add("Walk dog");
    assert_eq!(texts(&store, Filter::All), ["Walk dog", "Buy milk"]);

    store.toggle(&milk);
    assert_eq!(
        store.stats(),
        Stats {
            total: 2,
            active: 1,
            completed: 1,
            completion_percentage: 50,
        }
    );

    store.clear_completed();
    assert_eq!(texts(&store, Filter::All), ["Walk dog"]);
}

#[test]
fn test_clear_completed_is_idempotent() {
    let backend = MemoryStore::new();
    let mut store = memory_store(&backend);
    let a = store.add("a").unwrap();
    store.add("b");
    let c = store.add("c").unwrap();
    store.toggle(&a);
    store.toggle(&c);

    store.clear_completed();
    let once = store.todos().to_vec();
    store.clear_completed();

    assert_eq!(store.todos(), once.as_slice());
    assert_eq!(JsonStorage::new(backend).load().unwrap(), once);
}

#[test]
fn test_blank_input_changes_nothing() {
    let backend = MemoryStore::new();
    let mut store = memory_store(&backend);
    let id = store.add("Buy milk").unwrap();
    let before = store.todos().to_vec();
    let saved = backend.get(DEFAULT_STORAGE_KEY).unwrap();

    assert_eq!(store.add(""), None);
    assert_eq!(store.add("   "), None);
    store.update(&id, "");
    store.update(&id, " \t ");

    assert_eq!(store.todos(), before.as_slice());
    assert_eq!(backend.get(DEFAULT_STORAGE_KEY).unwrap(), saved);
}

#[test]
fn test_toggle_twice_restores_flag_and_advances_timestamp() {
    let mut store = TodoStore::open(TodoEnvironment::new(
        Arc::new(StepClock::new(test_epoch(), Duration::milliseconds(10))),
        Arc::new(SequentialIdGenerator::default()),
        Arc::new(JsonStorage::new(MemoryStore::new())),
    ));
    let id = store.add("Buy milk").unwrap();
    let created = store.get(&id).unwrap().clone();

    store.toggle(&id);
    let first = store.get(&id).unwrap().clone();
    store.toggle(&id);
    let second = store.get(&id).unwrap().clone();

    assert!(first.completed);
    assert_eq!(second.completed, created.completed);
    assert!(first.updated_at > created.updated_at);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(second.created_at, created.created_at);
}

#[test]
fn test_unknown_ids_leave_list_unchanged() {
    let mut store = memory_store(&MemoryStore::new());
    store.add("Buy milk");
    let before = store.todos().to_vec();
    let missing = TodoId::from("nonexistent");

    store.toggle(&missing);
    store.delete(&missing);
    store.update(&missing, "x");
    store.delete(&before[0].id);
    store.delete(&before[0].id);

    assert!(store.todos().is_empty());
}

#[test]
fn test_malformed_data_loads_as_empty_and_is_overwritten() {
    init_tracing();
    let backend = MemoryStore::new();
    backend.set(DEFAULT_STORAGE_KEY, r#"{"todos": "nope"}"#).unwrap();

    let mut store = memory_store(&backend);
    assert!(store.todos().is_empty());

    store.add("Fresh start");
    let reloaded = JsonStorage::new(backend).load().unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].text, "Fresh start");
}

#[test]
fn test_unreadable_item_does_not_erase_the_others() {
    init_tracing();
    let backend = MemoryStore::new();
    backend
        .set(
            DEFAULT_STORAGE_KEY,
            r#"[
                {"id":"a","text":"First","completed":false,
                 "createdAt":"2025-01-01T00:00:00Z","updatedAt":"2025-01-01T00:00:00Z"},
                {"id":"b","text":"Second","completed":true,
                 "createdAt":"2025-01-01T00:00:00Z","updatedAt":"2025-01-01T00:00:00Z"},
                {"id":"c","text":"Third","completed":false,
                 "createdAt":"2025-01-01T00:00:00Z"}
            ]"#,
        )
        .unwrap();

    let mut store = memory_store(&backend);
    assert_eq!(texts(&store, Filter::All), ["First", "Second"]);

    store.add("new");
    let saved = JsonStorage::new(backend.clone()).load().unwrap();
    let saved_texts: Vec<&str> = saved.iter().map(|todo| todo.text.as_str()).collect();
    assert_eq!(saved_texts, ["new", "First", "Second"]);

    let reopened = memory_store(&backend);
    assert_eq!(texts(&reopened, Filter::All), ["new", "First", "Second"]);
    assert!(reopened.get(&TodoId::from("b")).unwrap().completed);
}

#[test]
fn test_failed_save_keeps_in_memory_state() {
    init_tracing();

    // Measure what one todo costs, then allow exactly that much
    let sizing = MemoryStore::new();
    memory_store(&sizing).add("Buy milk");
    let quota = sizing.used_bytes().unwrap();

    let backend = MemoryStore::with_quota(quota);
    let mut store = memory_store(&backend);
    store.add("Buy milk");
    let saved = backend.get(DEFAULT_STORAGE_KEY).unwrap();

    store.add("Walk dog");
    assert_eq!(texts(&store, Filter::All), ["Walk dog", "Buy milk"]);
    assert_eq!(backend.get(DEFAULT_STORAGE_KEY).unwrap(), saved);

    // Shrinking back under the quota saves again
    let dog = store.todos()[0].id.clone();
    store.delete(&dog);
    let reloaded = JsonStorage::new(backend).load().unwrap();
    assert_eq!(reloaded, store.todos());
}

#[test]
fn test_file_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default().with_data_dir(dir.path());

    let (milk, created_at) = {
        let mut store = TodoStore::open(config.environment().unwrap());
        let milk = store.add("Buy milk").unwrap();
        store.add("Walk dog");
        store.toggle(&milk);
        let created_at = store.get(&milk).unwrap().created_at;
        (milk, created_at)
    };

    let mut store = TodoStore::open(config.environment().unwrap());
    assert_eq!(texts(&store, Filter::All), ["Walk dog", "Buy milk"]);
    let restored = store.get(&milk).unwrap();
    assert!(restored.completed);
    assert_eq!(restored.created_at, created_at);
    assert_eq!(store.filter(), Filter::All);

    store.clear_completed();
    let raw = FileStore::new(dir.path()).get("todos").unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(1));
    assert_eq!(json[0]["text"], "Walk dog");
    assert!(json[0]["createdAt"].is_string());
    assert!(json[0].get("filter").is_none());
}

#[test]
fn test_storage_clear_then_initialize_empties_list() {
    let backend = MemoryStore::new();
    let mut store = memory_store(&backend);
    store.add("Buy milk");

    JsonStorage::new(backend).clear().unwrap();
    store.initialize();

    assert!(store.todos().is_empty());
}

#[test]
fn test_filter_is_not_persisted() {
    let backend = MemoryStore::new();
    let mut store = memory_store(&backend);
    store.add("Buy milk");
    let saved = backend.get(DEFAULT_STORAGE_KEY).unwrap();

    store.set_filter(Filter::Completed);

    assert_eq!(backend.get(DEFAULT_STORAGE_KEY).unwrap(), saved);
    assert_eq!(store.visible().count(), 0);
    assert_eq!(memory_store(&backend).filter(), Filter::All);
}
