// Task categories and their lifecycle

use crate::models::{new_id, now_ms};
use crate::record::{self, Record};
use crate::storage::Storage;
use crate::store::TodoStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Label given to tasks whose category was deleted
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Swatches offered for categories; the first is the default
pub const PALETTE: [&str; 8] = [
    "#6366f1", // indigo
    "#8b5cf6", // violet
    "#06b6d4", // cyan
    "#10b981", // emerald
    "#f59e0b", // amber
    "#ef4444", // red
    "#ec4899", // pink
    "#84cc16", // lime
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(name: impl Into<String>, color: &str) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            color: normalize_color(color),
        }
    }
}

impl Record for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind() -> &'static str {
        "category"
    }
}

/// A category with its derived count of active tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: Category,
    pub active_count: usize,
}

/// Categories seeded on first use
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("Work", "#6366f1"),
        Category::new("Personal", "#10b981"),
        Category::new("Shopping", "#f59e0b"),
    ]
}

/// Accept `#rrggbb` (lowercased); anything else becomes the default swatch
pub fn normalize_color(color: &str) -> String {
    let color = color.trim();
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        color.to_ascii_lowercase()
    } else {
        PALETTE[0].to_string()
    }
}

impl<S: Storage> TodoStore<S> {
    /// Replace the in-memory categories with what the backend holds
    ///
    /// Seeds and persists the defaults when nothing is stored; unparseable
    /// data yields an empty list.
    pub fn load_categories(&mut self) -> &[Category] {
        let key = self.options.categories_key.as_str();

        match record::read_records::<Category, S>(&self.storage, key) {
            Ok(Some(categories)) => {
                debug!(key, count = categories.len(), "Loaded categories");
                self.categories = categories;
            }
            Ok(None) => {
                info!(key, "No stored categories, seeding defaults");
                self.categories = default_categories();
                self.persist_categories();
            }
            Err(e) => {
                warn!(key, error = ?e, "Failed to load categories, starting empty");
                self.categories = Vec::new();
            }
        }

        &self.categories
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        record::position(&self.categories, id).map(|i| &self.categories[i])
    }

    /// Returns the new category id, or `None` when `name` is blank
    pub fn add_category(&mut self, name: &str, color: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let category = Category::new(name, color);
        let id = category.id.clone();
        debug!(id = %id, name, "Adding category");

        self.categories.push(category);
        self.persist_categories();

        Some(id)
    }

    /// Rename and recolor a category, carrying its tasks over to the new name
    pub fn edit_category(&mut self, id: &str, name: &str, color: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let Some(index) = record::position(&self.categories, id) else {
            return false;
        };

        let old_name = std::mem::replace(&mut self.categories[index].name, name.to_string());
        self.categories[index].color = normalize_color(color);
        self.persist_categories();

        if old_name != name && self.relabel_tasks(&old_name, name) > 0 {
            self.persist_tasks();
        }

        true
    }

    /// Delete a category; its tasks move to [`UNCATEGORIZED`]
    pub fn delete_category(&mut self, id: &str) -> bool {
        let Some(index) = record::position(&self.categories, id) else {
            return false;
        };

        let removed = self.categories.remove(index);
        self.persist_categories();

        let moved = self.relabel_tasks(&removed.name, UNCATEGORIZED);
        if moved > 0 {
            info!(category = %removed.name, moved, "Reassigned tasks of deleted category");
            self.persist_tasks();
        }

        true
    }

    /// Active tasks carrying the given category label
    pub fn active_count_for(&self, name: &str) -> usize {
        self.tasks.iter().filter(|t| !t.completed && t.category == name).count()
    }

    /// Every category with its active task count, computed now
    pub fn category_summaries(&self) -> Vec<CategorySummary> {
        self.categories
            .iter()
            .map(|category| CategorySummary {
                category: category.clone(),
                active_count: self.active_count_for(&category.name),
            })
            .collect()
    }

    fn relabel_tasks(&mut self, from: &str, to: &str) -> usize {
        let now = now_ms();
        let mut moved = 0;
        for task in self.tasks.iter_mut().filter(|t| t.category == from) {
            task.category = to.to_string();
            task.updated_at = now;
            moved += 1;
        }
        moved
    }
}
