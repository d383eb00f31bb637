//! Store trait and its JSONL / in-memory backends

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    Duplicate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A storable record with a stable string identifier
pub trait Record: Serialize + DeserializeOwned + Clone + Send + 'static {
    /// Stable unique identifier for this record
    fn id(&self) -> &str;
}

/// Storage contract for itinerary records
///
/// Implementations must be safe to share across tasks (`Send + Sync`);
/// all methods take `&self` and guard interior state themselves.
pub trait Store<R: Record>: Send + Sync {
    /// Persist a new record. Fails on duplicate id.
    fn create(&self, record: R) -> Result<String, StoreError>;

    /// Fetch a record by id.
    fn get(&self, id: &str) -> Result<R, StoreError>;

    /// Delete a record by id.
    fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// List all record ids, in creation order.
    fn list(&self) -> Result<Vec<String>, StoreError>;
}

/// JSONL-backed store: one serialized record per line
///
/// Creates append to the file; deletes rewrite it without the removed
/// record. The in-memory index is the source of truth between flushes.
pub struct JsonlStore<R: Record> {
    path: PathBuf,
    inner: Mutex<Inner<R>>,
}

struct Inner<R> {
    records: HashMap<String, R>,
    order: Vec<String>,
}

impl<R: Record> JsonlStore<R> {
    /// Open (or create) a store at the given file path
    ///
    /// Malformed lines are skipped with a warning rather than failing the
    /// whole load; later duplicates of an id override earlier ones.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "JsonlStore::open: called");

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut records = HashMap::new();
        let mut order = Vec::new();

        if path.exists() {
            let file = File::open(&path)?;
            for (lineno, line) in BufReader::new(file).lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<R>(&line) {
                    Ok(record) => {
                        let id = record.id().to_string();
                        if records.insert(id.clone(), record).is_none() {
                            order.push(id);
                        }
                    }
                    Err(e) => {
                        warn!(path = %path.display(), lineno, error = %e, "Skipping malformed record line");
                    }
                }
            }
            info!(path = %path.display(), count = records.len(), "Loaded store");
        }

        Ok(Self {
            path,
            inner: Mutex::new(Inner { records, order }),
        })
    }

    /// Rewrite the whole file from the in-memory index
    fn rewrite(&self, inner: &Inner<R>) -> Result<(), StoreError> {
        debug!(path = %self.path.display(), count = inner.order.len(), "JsonlStore::rewrite: called");
        let tmp = self.path.with_extension("jsonl.tmp");
        {
            let mut file = File::create(&tmp)?;
            for id in &inner.order {
                if let Some(record) = inner.records.get(id) {
                    serde_json::to_writer(&mut file, record)?;
                    file.write_all(b"\n")?;
                }
            }
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl<R: Record> Store<R> for JsonlStore<R> {
    fn create(&self, record: R) -> Result<String, StoreError> {
        let id = record.id().to_string();
        debug!(%id, "JsonlStore::create: called");

        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.records.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        serde_json::to_writer(&mut file, &record)?;
        file.write_all(b"\n")?;

        inner.order.push(id.clone());
        inner.records.insert(id.clone(), record);
        Ok(id)
    }

    fn get(&self, id: &str) -> Result<R, StoreError> {
        debug!(%id, "JsonlStore::get: called");
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        debug!(%id, "JsonlStore::delete: called");
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.records.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        inner.order.retain(|x| x != id);
        self.rewrite(&inner)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.order.clone())
    }
}

/// In-memory store for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryStore<R: Record> {
    inner: Mutex<Inner<R>>,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }
}

impl<R: Record> Default for Inner<R> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<R: Record> Store<R> for MemoryStore<R> {
    fn create(&self, record: R) -> Result<String, StoreError> {
        let id = record.id().to_string();
        debug!(%id, "MemoryStore::create: called");
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.records.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        inner.order.push(id.clone());
        inner.records.insert(id.clone(), record);
        Ok(id)
    }

    fn get(&self, id: &str) -> Result<R, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.records.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        inner.order.retain(|x| x != id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.order.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestRecord {
        id: String,
        payload: String,
    }

    impl Record for TestRecord {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn rec(id: &str, payload: &str) -> TestRecord {
        TestRecord {
            id: id.to_string(),
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_memory_store_crud() {
        let store = MemoryStore::new();

        store.create(rec("a", "one")).unwrap();
        store.create(rec("b", "two")).unwrap();

        assert_eq!(store.get("a").unwrap().payload, "one");
        assert_eq!(store.list().unwrap(), vec!["a", "b"]);

        store.delete("a").unwrap();
        assert!(matches!(store.get("a"), Err(StoreError::NotFound(_))));
        assert_eq!(store.list().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_duplicate_create_rejected() {
        let store = MemoryStore::new();
        store.create(rec("a", "one")).unwrap();
        assert!(matches!(store.create(rec("a", "again")), Err(StoreError::Duplicate(_))));
    }

    #[test]
    fn test_jsonl_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.jsonl");

        {
            let store: JsonlStore<TestRecord> = JsonlStore::open(&path).unwrap();
            store.create(rec("a", "one")).unwrap();
            store.create(rec("b", "two")).unwrap();
        }

        let store: JsonlStore<TestRecord> = JsonlStore::open(&path).unwrap();
        assert_eq!(store.get("a").unwrap().payload, "one");
        assert_eq!(store.list().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_jsonl_store_delete_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.jsonl");

        {
            let store: JsonlStore<TestRecord> = JsonlStore::open(&path).unwrap();
            store.create(rec("a", "one")).unwrap();
            store.create(rec("b", "two")).unwrap();
            store.delete("a").unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("\"a\""));

        let store: JsonlStore<TestRecord> = JsonlStore::open(&path).unwrap();
        assert_eq!(store.list().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_jsonl_store_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.jsonl");
        std::fs::write(&path, "{\"id\":\"a\",\"payload\":\"one\"}\nnot json\n").unwrap();

        let store: JsonlStore<TestRecord> = JsonlStore::open(&path).unwrap();
        assert_eq!(store.list().unwrap(), vec!["a"]);
    }
}
