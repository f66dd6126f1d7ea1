//! JSON file repository: one pretty-printed array per collection.
//!
//! The file is read once at open. Every write builds the new collection,
//! persists it to `<collection>.json.tmp` and renames it over the live file,
//! and only then swaps it into memory, so a failed write changes nothing.

use super::{delete_from, insert_into, update_in, Record, Repository};
use helpdesk_shared::{DeskError, DeskResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

pub struct JsonFileRepository<T> {
    path: PathBuf,
    records: Mutex<Vec<T>>,
}

impl<T: Record> JsonFileRepository<T> {
    /// Open `<dir>/<collection>.json`; a missing file is an empty collection
    pub fn open(dir: &Path) -> DeskResult<Self> {
        let path = dir.join(format!("{}.json", T::COLLECTION));
        let records: Vec<T> = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };
        info!("  Loaded {} {} from {}", records.len(), T::COLLECTION, path.display());
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> DeskResult<MutexGuard<'_, Vec<T>>> {
        self.records
            .lock()
            .map_err(|_| DeskError::Internal(format!("{} store lock poisoned", T::COLLECTION)))
    }

    fn persist(&self, records: &[T]) -> DeskResult<()> {
        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;
        drop(writer);

        std::fs::rename(&temp_path, &self.path)?;
        debug!("  Wrote {} {} to {}", records.len(), T::COLLECTION, self.path.display());
        Ok(())
    }

    /// Apply `change` to a copy, persist it, then commit it in memory
    fn write_with<R>(&self, change: impl FnOnce(&mut Vec<T>) -> DeskResult<R>) -> DeskResult<R> {
        let mut guard = self.lock()?;
        let mut next = guard.clone();
        let result = change(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(result)
    }
}

impl<T: Record> Repository<T> for JsonFileRepository<T> {
    fn list(&self) -> DeskResult<Vec<T>> {
        Ok(self.lock()?.clone())
    }

    fn get(&self, id: &str) -> DeskResult<Option<T>> {
        Ok(self.lock()?.iter().find(|r| r.id() == id).cloned())
    }

    fn insert(&self, record: T) -> DeskResult<T> {
        self.write_with(|records| insert_into(records, record))
    }

    fn update(&self, record: T) -> DeskResult<T> {
        self.write_with(|records| update_in(records, record))
    }

    fn delete(&self, id: &str) -> DeskResult<bool> {
        self.write_with(|records| Ok(delete_from(records, id)))
    }
}
