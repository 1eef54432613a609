// TodoStore - Persisted todo-list state over a pluggable key-value backend

pub mod categories;
pub mod config;
pub mod filter;
pub mod models;
pub mod record;
pub mod stats;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use categories::{Category, CategorySummary, UNCATEGORIZED};
pub use config::{Backend, Config};
pub use filter::{Filter, View};
pub use models::{Priority, Task, now_ms};
pub use record::Record;
pub use stats::CompletionStats;
pub use storage::{FileStorage, MemoryStorage, SqliteStorage, Storage};
pub use store::{Counts, StoreOptions, TodoStore};
