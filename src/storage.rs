// Key-value persistence backends

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::now_ms;

/// Synchronous string key-value store, scoped to one data directory
pub trait Storage {
    /// Value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Validate a storage key
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid storage key: {} (must be ASCII alphanumeric with _/-)", key));
    }
    Ok(())
}

// ============================================================================
// In-memory backend
// ============================================================================

/// Volatile backend with an optional quota on the total stored bytes
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would push keys plus values past `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(bytes),
        }
    }

    /// Bytes currently used by keys and values
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;

        if let Some(quota) = self.quota {
            let existing = self.entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let needed = self.used_bytes() - existing + key.len() + value.len();
            if needed > quota {
                return Err(eyre!("Storage quota exceeded: {} bytes needed, {} allowed", needed, quota));
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// SQLite backend
// ============================================================================

/// Durable backend holding every key in a single SQLite table
pub struct SqliteStorage {
    db: Connection,
}

impl SqliteStorage {
    /// Open or create `todostore.db` inside `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).context("Failed to create storage directory")?;

        let db_path = dir.join("todostore.db");
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;

        let storage = Self { db };
        storage.create_schema()?;
        Ok(storage)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let storage = Self { db };
        storage.create_schema()?;
        Ok(storage)
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating storage schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;

        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, now_ms()],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.db.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

// ============================================================================
// File backend
// ============================================================================

/// Durable backend storing each key as `<key>.json` in a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context("Failed to create storage directory")?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&path).context("Failed to open storage file")?;
        file.lock_shared().context("Failed to acquire file lock")?;

        let mut content = String::new();
        file.read_to_string(&mut content)?;

        // Lock is automatically released when file is dropped
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .context("Failed to open storage file for writing")?;

        // Truncate only once we hold the lock
        file.lock_exclusive().context("Failed to acquire file lock")?;
        file.set_len(0)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(&path).context("Failed to remove storage file")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise_backend(storage: &mut dyn Storage) {
        assert_eq!(storage.get("todos").unwrap(), None);

        storage.set("todos", "[]").unwrap();
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some("[]"));

        storage.set("todos", r#"[{"id":"1"}]"#).unwrap();
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some(r#"[{"id":"1"}]"#));

        storage.remove("todos").unwrap();
        assert_eq!(storage.get("todos").unwrap(), None);

        // Removing again is fine
        storage.remove("todos").unwrap();
    }

    #[test]
    fn test_memory_backend() {
        let mut storage = MemoryStorage::new();
        exercise_backend(&mut storage);
    }

    #[test]
    fn test_sqlite_backend() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        exercise_backend(&mut storage);
    }

    #[test]
    fn test_file_backend() {
        let temp = TempDir::new().unwrap();
        let mut storage = FileStorage::open(temp.path()).unwrap();
        exercise_backend(&mut storage);
    }

    #[test]
    fn test_boxed_backend() {
        let mut storage: Box<dyn Storage> = Box::new(MemoryStorage::new());
        storage.set("todo-categories", "[]").unwrap();
        assert_eq!(storage.get("todo-categories").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_sqlite_persists_across_reopen() {
        let temp = TempDir::new().unwrap();

        {
            let mut storage = SqliteStorage::open(temp.path()).unwrap();
            storage.set("todos", "[1,2,3]").unwrap();
        }

        let storage = SqliteStorage::open(temp.path()).unwrap();
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some("[1,2,3]"));
        assert!(temp.path().join("todostore.db").exists());
    }

    #[test]
    fn test_file_backend_shorter_value_overwrites_fully() {
        let temp = TempDir::new().unwrap();
        let mut storage = FileStorage::open(temp.path()).unwrap();

        storage.set("todos", "a much longer value").unwrap();
        storage.set("todos", "short").unwrap();

        assert_eq!(storage.get("todos").unwrap().as_deref(), Some("short"));
        assert!(storage.dir().join("todos.json").exists());
    }

    #[test]
    fn test_memory_quota_rejects_oversized_write() {
        let mut storage = MemoryStorage::with_quota(20);
        storage.set("todos", "[]").unwrap();

        let result = storage.set("todos", &"x".repeat(50));
        assert!(result.is_err());

        // Previous value survives the rejected write
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_quota_counts_replaced_value_once() {
        let mut storage = MemoryStorage::with_quota(15);
        storage.set("todos", "1234567890").unwrap();
        // Replacing the same key frees the old value first
        storage.set("todos", "0987654321").unwrap();
        assert_eq!(storage.used_bytes(), 15);
    }

    #[test]
    fn test_validate_key() {
        // Valid
        assert!(validate_key("todos").is_ok());
        assert!(validate_key("todo-categories").is_ok());
        assert!(validate_key("todo_material_app").is_ok());

        // Invalid
        assert!(validate_key("").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key(&"a".repeat(65)).is_err());
        assert!(validate_key(&"a".repeat(64)).is_ok());
        assert!(validate_key("задачи").is_err());
        assert!(validate_key("todos✓").is_err());
    }

    #[test]
    fn test_invalid_key_rejected_by_all_backends() {
        let temp = TempDir::new().unwrap();
        let mut memory = MemoryStorage::new();
        let mut sqlite = SqliteStorage::open_in_memory().unwrap();
        let mut files = FileStorage::open(temp.path()).unwrap();

        assert!(memory.set("bad/key", "[]").is_err());
        assert!(sqlite.set("bad/key", "[]").is_err());
        assert!(files.set("bad/key", "[]").is_err());
    }
}
