// Generic record trait for any storable type

use eyre::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

use crate::storage::Storage;

/// Core trait that any record persisted as a JSON array must implement
pub trait Record: Serialize + DeserializeOwned + Clone + 'static {
    /// Unique identifier for this record
    fn id(&self) -> &str;

    /// Short name used in log fields (e.g., "task", "category")
    fn kind() -> &'static str
    where
        Self: Sized;
}

/// Index of the record with the given id
pub fn position<T: Record>(records: &[T], id: &str) -> Option<usize> {
    records.iter().position(|r| r.id() == id)
}

/// Read a JSON-encoded array of records stored under `key`
///
/// Returns `Ok(None)` when nothing is stored under the key.
pub fn read_records<T: Record, S: Storage + ?Sized>(storage: &S, key: &str) -> Result<Option<Vec<T>>> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };

    let records: Vec<T> =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {} records under key {}", T::kind(), key))?;

    Ok(Some(records))
}

/// Replace the whole array stored under `key`
pub fn write_records<T: Record, S: Storage + ?Sized>(storage: &mut S, key: &str, records: &[T]) -> Result<()> {
    let json = serde_json::to_string(records).context("Failed to serialize records")?;
    storage.set(key, &json)
}
