//! Example 02: Categories
//!
//! Shows the seeded default categories, derived active counts, renaming a
//! category (its tasks follow) and deleting one (its tasks become
//! "Uncategorized"). Uses the file backend.
//!
//! Run with: cargo run --example 02_categories

use eyre::Result;
use todostore::{FileStorage, Storage, TodoStore, UNCATEGORIZED};

fn print_summaries<S: Storage>(store: &TodoStore<S>) {
    for summary in store.category_summaries() {
        println!(
            "   {} {:<10} {} active",
            summary.category.color, summary.category.name, summary.active_count
        );
    }
}

fn main() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let mut store = TodoStore::open(FileStorage::open(temp_dir.path())?);

    println!("TodoStore Categories Example");
    println!("============================\n");

    println!("1. Default categories:");
    print_summaries(&store);
    println!();

    println!("2. Adding tasks and a category...");
    store.add_with("Quarterly report", None, Some("Work"));
    store.add_with("Team slides", None, Some("Work"));
    let milk = store.add_with("Milk", None, Some("Shopping")).unwrap_or_default();
    store.add_category("Health", "#ec4899");
    store.add_with("Book dentist", None, Some("Health"));
    print_summaries(&store);
    println!();

    println!("3. Renaming Work to Office...");
    let work = store.categories().iter().find(|c| c.name == "Work").map(|c| c.id.clone());
    if let Some(id) = work {
        store.edit_category(&id, "Office", "#8b5cf6");
    }
    print_summaries(&store);
    println!();

    println!("4. Deleting Shopping...");
    let shopping = store.categories().iter().find(|c| c.name == "Shopping").map(|c| c.id.clone());
    if let Some(id) = shopping {
        store.delete_category(&id);
    }
    print_summaries(&store);
    if let Some(task) = store.get(&milk) {
        assert_eq!(task.category, UNCATEGORIZED);
        println!("   '{}' is now in {}", task.text, task.category);
    }

    println!("\nExample complete!");
    Ok(())
}
