// Todo collection state with write-back persistence

use crate::categories::Category;
use crate::filter::{Filter, View};
use crate::models::{DEFAULT_CATEGORY, Priority, Task, now_ms};
use crate::record;
use crate::stats::{self, CompletionStats};
use crate::storage::Storage;
use chrono::{DateTime, TimeZone};
use tracing::{debug, info, warn};

/// Storage key holding the task array
pub const TODOS_KEY: &str = "todos";

/// Storage key holding the category array
pub const CATEGORIES_KEY: &str = "todo-categories";

/// Per-session settings for a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub todos_key: String,
    pub categories_key: String,
    pub default_priority: Priority,
    pub default_category: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            todos_key: TODOS_KEY.to_string(),
            categories_key: CATEGORIES_KEY.to_string(),
            default_priority: Priority::default(),
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

/// Task totals derived from the current collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// Authoritative in-memory task list for one session
///
/// Every mutation rewrites the full collection to the storage backend. Write
/// failures are logged and otherwise ignored: the in-memory state stays
/// authoritative for the rest of the session.
pub struct TodoStore<S: Storage> {
    pub(crate) storage: S,
    pub(crate) options: StoreOptions,
    pub(crate) tasks: Vec<Task>,
    pub(crate) categories: Vec<Category>,
    view: View,
}

impl<S: Storage> TodoStore<S> {
    /// Open a store over `storage` with default options
    pub fn open(storage: S) -> Self {
        Self::with_options(storage, StoreOptions::default())
    }

    /// Open a store and load tasks and categories from `storage`
    pub fn with_options(storage: S, options: StoreOptions) -> Self {
        let mut store = Self {
            storage,
            options,
            tasks: Vec::new(),
            categories: Vec::new(),
            view: View::default(),
        };

        store.load();
        store.load_categories();

        store
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Tear the session down and hand back the backend
    pub fn into_storage(self) -> S {
        self.storage
    }

    // ========================================================================
    // Loading and persistence
    // ========================================================================

    /// Replace the in-memory list with what the backend holds
    ///
    /// Missing or unparseable data yields an empty collection.
    pub fn load(&mut self) -> &[Task] {
        let key = self.options.todos_key.as_str();

        self.tasks = match record::read_records::<Task, S>(&self.storage, key) {
            Ok(Some(tasks)) => {
                info!(key, count = tasks.len(), "Loaded tasks");
                tasks
            }
            Ok(None) => {
                debug!(key, "No stored tasks");
                Vec::new()
            }
            Err(e) => {
                warn!(key, error = ?e, "Failed to load tasks, starting empty");
                Vec::new()
            }
        };

        &self.tasks
    }

    pub(crate) fn persist_tasks(&mut self) {
        let key = self.options.todos_key.as_str();
        if let Err(e) = record::write_records(&mut self.storage, key, &self.tasks) {
            warn!(key, count = self.tasks.len(), error = ?e, "Failed to persist tasks");
        }
    }

    pub(crate) fn persist_categories(&mut self) {
        let key = self.options.categories_key.as_str();
        if let Err(e) = record::write_records(&mut self.storage, key, &self.categories) {
            warn!(key, count = self.categories.len(), error = ?e, "Failed to persist categories");
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Every task, newest first
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        record::position(&self.tasks, id).map(|i| &self.tasks[i])
    }

    /// Tasks passing the current filter and search term
    pub fn list(&self) -> Vec<&Task> {
        self.view.apply(&self.tasks)
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.view.filter = filter;
    }

    pub fn search(&mut self, term: impl Into<String>) {
        self.view.search = term.into();
    }

    pub fn counts(&self) -> Counts {
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        Counts {
            total: self.tasks.len(),
            active: self.tasks.len() - completed,
            completed,
        }
    }

    pub fn has_completed(&self) -> bool {
        self.tasks.iter().any(|t| t.completed)
    }

    pub fn has_active(&self) -> bool {
        self.tasks.iter().any(|t| !t.completed)
    }

    /// Completion totals bucketed relative to `now`
    pub fn completion_stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> CompletionStats {
        stats::completion_stats(&self.tasks, now)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a task with the session's default priority and category
    pub fn add(&mut self, text: &str) -> Option<String> {
        self.add_with(text, None, None)
    }

    /// Add a task at the front of the list
    ///
    /// Returns the new id, or `None` when `text` is blank.
    pub fn add_with(&mut self, text: &str, priority: Option<Priority>, category: Option<&str>) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring blank task text");
            return None;
        }

        let priority = priority.unwrap_or(self.options.default_priority);
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.options.default_category.as_str())
            .to_string();

        let task = Task::new(text, priority, category);
        let id = task.id.clone();
        debug!(id = %id, "Adding task");

        self.tasks.insert(0, task);
        self.persist_tasks();

        Some(id)
    }

    /// Remove a task; returns false when the id is unknown
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = record::position(&self.tasks, id) else {
            return false;
        };

        self.tasks.remove(index);
        self.persist_tasks();
        true
    }

    /// Flip completion; returns the new state, or `None` for an unknown id
    pub fn toggle_complete(&mut self, id: &str) -> Option<bool> {
        let index = record::position(&self.tasks, id)?;

        let task = &mut self.tasks[index];
        let completed = !task.completed;
        task.set_completed(completed);

        self.persist_tasks();
        Some(completed)
    }

    /// Replace a task's text; blank text and unknown ids are ignored
    pub fn edit(&mut self, id: &str, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let Some(index) = record::position(&self.tasks, id) else {
            return false;
        };

        let task = &mut self.tasks[index];
        task.text = text.to_string();
        task.updated_at = now_ms();

        self.persist_tasks();
        true
    }

    pub fn set_priority(&mut self, id: &str, priority: Priority) -> bool {
        let Some(index) = record::position(&self.tasks, id) else {
            return false;
        };

        let task = &mut self.tasks[index];
        task.priority = priority;
        task.updated_at = now_ms();

        self.persist_tasks();
        true
    }

    /// Move a task to another category label; blank labels are ignored
    pub fn set_category(&mut self, id: &str, category: &str) -> bool {
        let category = category.trim();
        if category.is_empty() {
            return false;
        }
        let Some(index) = record::position(&self.tasks, id) else {
            return false;
        };

        let task = &mut self.tasks[index];
        task.category = category.to_string();
        task.updated_at = now_ms();

        self.persist_tasks();
        true
    }

    /// Complete everything, or reopen everything when all are already done
    pub fn toggle_all(&mut self) {
        if self.tasks.is_empty() {
            return;
        }

        let target = !self.tasks.iter().all(|t| t.completed);
        for task in &mut self.tasks {
            task.set_completed(target);
        }

        self.persist_tasks();
    }

    /// Drop every completed task; returns how many were removed
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();

        if removed > 0 {
            info!(removed, "Cleared completed tasks");
            self.persist_tasks();
        }

        removed
    }
}
