//! Example 01: Basic CRUD Operations
//!
//! Adds, completes, edits, filters and deletes tasks in a SQLite-backed
//! store, then reopens the store to show the list survived.
//!
//! Run with: cargo run --example 01_basic_crud

use eyre::Result;
use todostore::{Filter, Priority, SqliteStorage, TodoStore};

fn main() -> Result<()> {
    // Create a temporary directory for this example
    let temp_dir = tempfile::tempdir()?;
    let data_dir = temp_dir.path().to_path_buf();

    println!("TodoStore Basic CRUD Example");
    println!("============================\n");
    println!("Data directory: {}\n", data_dir.display());

    let mut store = TodoStore::open(SqliteStorage::open(&data_dir)?);

    // CREATE
    println!("1. CREATE - Adding tasks...");
    let milk = store.add("Buy milk").unwrap_or_default();
    let eggs = store.add("Buy eggs").unwrap_or_default();
    let report = store
        .add_with("Finish quarterly report", Some(Priority::High), Some("Work"))
        .unwrap_or_default();
    println!("   Added {} tasks", store.counts().total);

    // Blank text is ignored
    assert!(store.add("   ").is_none());
    println!("   Blank task was ignored\n");

    // UPDATE
    println!("2. UPDATE - Completing and editing...");
    store.toggle_complete(&eggs);
    store.edit(&report, "Finish Q3 report");
    if let Some(task) = store.get(&report) {
        println!("   Edited text: {}", task.text);
    }
    println!();

    // READ
    println!("3. READ - Filtering and searching...");
    store.set_filter(Filter::Active);
    store.search("buy");
    for task in store.list() {
        println!("   - {} ({})", task.text, task.priority);
    }
    let counts = store.counts();
    println!(
        "   {} total, {} active, {} completed\n",
        counts.total, counts.active, counts.completed
    );

    // DELETE
    println!("4. DELETE - Removing a task and clearing completed...");
    store.remove(&milk);
    let cleared = store.clear_completed();
    println!("   Cleared {} completed task(s)\n", cleared);

    // Reopen the store to confirm persistence
    println!("5. REOPEN - Loading from disk...");
    drop(store);
    let store = TodoStore::open(SqliteStorage::open(&data_dir)?);
    for task in store.tasks() {
        println!("   - {} [{}]", task.text, task.category);
    }

    println!("\nExample complete!");
    Ok(())
}
