// Data models for TodoStore

use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Category label given to tasks created without one
pub const DEFAULT_CATEGORY: &str = "general";

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_category")]
    pub category: String,
    pub created_at: i64,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub updated_at: i64,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Task {
    /// Build a fresh, active task. `text` is expected to be trimmed and non-empty.
    pub fn new(text: impl Into<String>, priority: Priority, category: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            id: new_id(),
            text: text.into(),
            completed: false,
            priority,
            category: category.into(),
            created_at: now,
            completed_at: None,
            updated_at: now,
        }
    }

    /// Flip completion, stamping or clearing `completed_at`
    pub fn set_completed(&mut self, completed: bool) {
        if self.completed == completed {
            return;
        }
        let now = now_ms();
        self.completed = completed;
        self.completed_at = if completed { Some(now) } else { None };
        self.updated_at = now;
    }

    /// Case-insensitive substring match on the task text
    pub fn text_contains(&self, term: &str) -> bool {
        self.text.to_lowercase().contains(&term.to_lowercase())
    }
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind() -> &'static str {
        "task"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {} (expected low, medium or high)", other)),
        }
    }
}

/// Generate a fresh record id (UUID v7, time-ordered)
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
