//! Process-local repository, used for tests and `backend = "memory"`.

use super::{delete_from, insert_into, update_in, Record, Repository};
use helpdesk_shared::{DeskError, DeskResult};
use std::sync::{Mutex, MutexGuard};

pub struct MemoryRepository<T> {
    records: Mutex<Vec<T>>,
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> DeskResult<MutexGuard<'_, Vec<T>>> {
        self.records
            .lock()
            .map_err(|_| DeskError::Internal(format!("{} store lock poisoned", T::COLLECTION)))
    }
}

impl<T: Record> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn list(&self) -> DeskResult<Vec<T>> {
        Ok(self.lock()?.clone())
    }

    fn get(&self, id: &str) -> DeskResult<Option<T>> {
        Ok(self.lock()?.iter().find(|r| r.id() == id).cloned())
    }

    fn insert(&self, record: T) -> DeskResult<T> {
        insert_into(&mut *self.lock()?, record)
    }

    fn update(&self, record: T) -> DeskResult<T> {
        update_in(&mut self.lock()?, record)
    }

    fn delete(&self, id: &str) -> DeskResult<bool> {
        Ok(delete_from(&mut *self.lock()?, id))
    }
}
