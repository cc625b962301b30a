//! Demo for the tasklist crate.
//!
//! Opens the file-backed list named by the environment, prints it, runs a
//! short scripted session against it, and prints it again.
//!
//! # Usage
//!
//! ```bash
//! TASKLIST_DATA_DIR=/tmp/tasklist RUST_LOG=tasklist=debug cargo run --bin tasklist
//! ```

use tasklist::{Config, Filter, TodoStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklist=info,tasklist_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        storage_key = %config.storage_key,
        "Configuration loaded"
    );

    let mut store = TodoStore::with_config(config.environment()?, config.store_config());
    store.initialize();

    println!("=== Tasklist ===\n");
    print_list("Loaded", &store);

    println!("\nAdding todos...");
    let milk = store.add("Buy milk");
    store.add("Walk dog");
    print_list("After adding", &store);

    if let Some(milk) = &milk {
        println!("\nCompleting 'Buy milk'...");
        store.toggle(milk);
    }
    print_stats(&store);

    println!("\nClearing completed...");
    store.clear_completed();
    print_list("Final", &store);
    print_stats(&store);

    println!("\nSaved to {}", config.data_dir.display());
    Ok(())
}

fn print_list(label: &str, store: &TodoStore) {
    println!("{label} ({} todos):", store.stats().total);
    for todo in store.list(Filter::All) {
        let status = if todo.completed { "✓" } else { " " };
        println!("  [{status}] {}", todo.text);
    }
}

fn print_stats(store: &TodoStore) {
    let stats = store.stats();
    println!(
        "Total: {}, active: {}, completed: {} ({}%)",
        stats.total, stats.active, stats.completed, stats.completion_percentage
    );
}
