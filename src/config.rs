// Session configuration loaded from an optional YAML file

use crate::models::{DEFAULT_CATEGORY, Priority};
use crate::storage::{FileStorage, MemoryStorage, SqliteStorage, Storage, validate_key};
use crate::store::{CATEGORIES_KEY, StoreOptions, TODOS_KEY};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Which storage backend a session persists to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    File,
    Memory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Sqlite => write!(f, "sqlite"),
            Backend::File => write!(f, "file"),
            Backend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "file" => Ok(Backend::File),
            "memory" => Ok(Backend::Memory),
            other => Err(format!("unknown backend: {} (expected sqlite, file or memory)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub todos_key: String,
    pub categories_key: String,
    pub default_priority: Priority,
    pub default_category: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            todos_key: TODOS_KEY.to_string(),
            categories_key: CATEGORIES_KEY.to_string(),
            default_priority: Priority::default(),
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl Config {
    /// Read `path`, or fall back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        info!(path = ?path, backend = %config.backend, "Loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_key(&self.todos_key).context("Invalid todos_key")?;
        validate_key(&self.categories_key).context("Invalid categories_key")?;
        if self.todos_key == self.categories_key {
            return Err(eyre::eyre!("todos_key and categories_key must differ"));
        }
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        let default_category = match self.default_category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            label => label.to_string(),
        };

        StoreOptions {
            todos_key: self.todos_key.clone(),
            categories_key: self.categories_key.clone(),
            default_priority: self.default_priority,
            default_category,
        }
    }

    /// Open the configured backend rooted at `data_dir`
    pub fn open_storage(&self, data_dir: &Path) -> Result<Box<dyn Storage>> {
        debug!(backend = %self.backend, data_dir = ?data_dir, "Opening storage");

        let storage: Box<dyn Storage> = match self.backend {
            Backend::Sqlite => Box::new(SqliteStorage::open(data_dir)?),
            Backend::File => Box::new(FileStorage::open(data_dir)?),
            Backend::Memory => Box::new(MemoryStorage::new()),
        };
        Ok(storage)
    }
}

/// Platform data directory for the store, or the current directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("todostore"))
        .unwrap_or_else(|| PathBuf::from("."))
}
