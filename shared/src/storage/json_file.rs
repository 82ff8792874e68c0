//! File-backed record store implementation.
//!
//! Persists the entire dataset as one JSON document. Every operation is a
//! full load-mutate-rewrite cycle executed under two locks: an in-process
//! mutex serializing tasks within this process, and a blocking `flock(2)`
//! advisory lock on a sibling `.lock` file guarding against concurrent
//! external processes. Writes land in a temporary file in the dataset's
//! directory and are renamed into place, so readers never observe a partial
//! file.
//!
//! This whole-dataset discipline trades throughput for strict
//! serializability and is a known scalability ceiling: each write is bounded
//! by dataset size and writers queue on one lock.

use super::record_store::{
    apply_delete, apply_update, stamp_new_record, Dataset, Filter, RecordStore, StoreError,
};
use serde_json::{Map, Value};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Record store backed by a single JSON file.
///
/// # Example
///
/// ```no_run
/// use shared::storage::{JsonFileStore, RecordStore};
/// use serde_json::json;
///
/// let store = JsonFileStore::new("/var/lib/agrisight/dataset.json");
/// store.add("telemetry", json!({"hub_id": "hub-1"})).unwrap();
/// ```
#[derive(Debug)]
pub struct JsonFileStore {
    data_path: PathBuf,
    lock_path: PathBuf,
    guard: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store persisting to the given file path.
    ///
    /// The file and its sibling lock file are created lazily on first write.
    #[must_use]
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        let data_path = data_path.into();
        let mut lock_name = data_path.clone().into_os_string();
        lock_name.push(".lock");
        Self {
            data_path,
            lock_path: PathBuf::from(lock_name),
            guard: Mutex::new(()),
        }
    }

    /// Loads the dataset from disk.
    ///
    /// A missing file is an empty dataset. A malformed file is also treated
    /// as empty (logged) so the service stays available after format drift;
    /// only genuine I/O failures propagate.
    fn load(&self) -> Result<Dataset, StoreError> {
        let bytes = match fs::read(&self.data_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Dataset::default());
            }
            Err(err) => return Err(StoreError::Io(err)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(dataset) => Ok(dataset),
            Err(err) => {
                tracing::warn!(
                    path = %self.data_path.display(),
                    error = %err,
                    "Malformed dataset file, continuing with an empty dataset"
                );
                Ok(Dataset::default())
            }
        }
    }

    /// Rewrites the dataset atomically: write to a temporary file in the
    /// same directory, then rename over the target.
    fn persist(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let dir = self.data_path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, dataset)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.data_path)
            .map_err(|err| StoreError::Io(err.error))?;
        Ok(())
    }

    /// Runs one serialized read-modify-write cycle.
    ///
    /// The closure returns its result plus whether the dataset was mutated;
    /// the rewrite only happens for mutations.
    fn with_dataset<T>(
        &self,
        operate: impl FnOnce(&mut Dataset) -> (T, bool),
    ) -> Result<T, StoreError> {
        let _guard = self.guard.lock().map_err(|_| StoreError::Lock)?;
        let _file_lock = FileLock::acquire(&self.lock_path)?;

        let mut dataset = self.load()?;
        let (result, dirty) = operate(&mut dataset);
        if dirty {
            self.persist(&dataset)?;
        }
        Ok(result)
    }
}

impl RecordStore for JsonFileStore {
    fn add(&self, collection: &str, record: Value) -> Result<Value, StoreError> {
        self.with_dataset(|dataset| {
            let mut record = record;
            stamp_new_record(&mut record);
            dataset
                .entry(collection.to_string())
                .or_default()
                .push(record.clone());
            (record, true)
        })
    }

    fn get(&self, collection: &str, filter: Option<&Filter>) -> Result<Vec<Value>, StoreError> {
        self.with_dataset(|dataset| {
            let records = match dataset.get(collection) {
                Some(records) => match filter {
                    Some(filter) => records
                        .iter()
                        .filter(|record| filter.matches(record))
                        .cloned()
                        .collect(),
                    None => records.clone(),
                },
                None => Vec::new(),
            };
            (records, false)
        })
    }

    fn update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &Map<String, Value>,
    ) -> Result<usize, StoreError> {
        self.with_dataset(|dataset| match dataset.get_mut(collection) {
            Some(records) => {
                let count = apply_update(records, filter, patch);
                (count, count > 0)
            }
            None => (0, false),
        })
    }

    fn delete(&self, collection: &str, filter: Option<&Filter>) -> Result<usize, StoreError> {
        self.with_dataset(|dataset| match dataset.get_mut(collection) {
            Some(records) => {
                let count = apply_delete(records, filter);
                (count, count > 0)
            }
            None => (0, false),
        })
    }

    fn overwrite(&self, collection: &str, records: Vec<Value>) -> Result<(), StoreError> {
        self.with_dataset(|dataset| {
            dataset.insert(collection.to_string(), records);
            ((), true)
        })
    }
}

/// Cross-process advisory lock, held for one read-modify-write cycle.
///
/// The lock file is never removed: deleting it would let a waiting process
/// acquire a lock on a dead inode while a newcomer creates a fresh file.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        Self::lock(&file)?;
        Ok(Self { file })
    }

    #[cfg(unix)]
    #[allow(unsafe_code)] // flock(2) needs the raw fd; std has no advisory file lock
    fn lock(file: &File) -> Result<(), StoreError> {
        use std::os::unix::io::AsRawFd;

        // LOCK_EX without LOCK_NB: block until the lock is available
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
        if rc != 0 {
            return Err(StoreError::Io(std::io::Error::last_os_error()));
        }
        Ok(())
    }

    #[cfg(unix)]
    #[allow(unsafe_code)]
    fn unlock(file: &File) {
        use std::os::unix::io::AsRawFd;

        // Best effort; closing the descriptor releases the lock anyway
        unsafe {
            libc::flock(file.as_raw_fd(), libc::LOCK_UN);
        }
    }

    // On non-unix targets the in-process mutex still serializes everything;
    // holding the file handle is the best we do without a platform lock.
    #[cfg(not(unix))]
    fn lock(_file: &File) -> Result<(), StoreError> {
        Ok(())
    }

    #[cfg(not(unix))]
    fn unlock(_file: &File) {}
}

impl Drop for FileLock {
    fn drop(&mut self) {
        Self::unlock(&self.file);
    }
}
