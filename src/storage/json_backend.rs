use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use uuid::Uuid;

use super::{OwnerId, RecordStore, StoreError, StoreResult};
use crate::{
    core::utils::{
        app_data_dir, canonical_name, ensure_dir, owner_dir_name, records_dir_in, write_atomic,
    },
    ledger::Record,
};

/// File-backed store keeping one pretty-printed JSON array per owner and entity kind,
/// laid out as `<root>/<owner>/<kind>.json`.
pub struct JsonStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(root: Option<PathBuf>) -> StoreResult<Self> {
        let root = root.unwrap_or_else(|| records_dir_in(&app_data_dir()));
        ensure_dir(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_for(&self, owner: &OwnerId, kind: &str) -> PathBuf {
        self.root
            .join(owner_dir_name(owner.as_str()))
            .join(format!("{}.json", canonical_name(kind)))
    }

    fn read_all<T: Record>(&self, owner: &OwnerId) -> StoreResult<Vec<T>> {
        let path = self.file_for(owner, T::KIND);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    fn write_all<T: Record>(&self, owner: &OwnerId, records: &[T]) -> StoreResult<()> {
        let path = self.file_for(owner, T::KIND);
        let json = serde_json::to_string_pretty(records)?;
        write_atomic(&path, &json)?;
        Ok(())
    }

    /// Read-modify-write under the store's lock so concurrent callers cannot interleave.
    fn modify<T, F>(&self, owner: &OwnerId, mutate: F) -> StoreResult<()>
    where
        T: Record,
        F: FnOnce(&mut Vec<T>) -> StoreResult<()>,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("json store lock poisoned".into()))?;
        let mut records = self.read_all::<T>(owner)?;
        mutate(&mut records)?;
        self.write_all(owner, &records)
    }
}

impl<T: Record> RecordStore<T> for JsonStore {
    fn list(&self, owner: &OwnerId) -> StoreResult<Vec<T>> {
        self.read_all(owner)
    }

    fn create(&self, owner: &OwnerId, record: &T) -> StoreResult<()> {
        self.modify(owner, |records: &mut Vec<T>| {
            if records.iter().any(|existing| existing.id() == record.id()) {
                return Err(StoreError::Duplicate {
                    kind: T::KIND,
                    id: record.id(),
                });
            }
            records.push(record.clone());
            Ok(())
        })
    }

    fn update(&self, owner: &OwnerId, record: &T) -> StoreResult<()> {
        self.modify(owner, |records: &mut Vec<T>| {
            let slot = records
                .iter_mut()
                .find(|existing| existing.id() == record.id())
                .ok_or(StoreError::Missing {
                    kind: T::KIND,
                    id: record.id(),
                })?;
            *slot = record.clone();
            Ok(())
        })
    }

    fn delete(&self, owner: &OwnerId, id: Uuid) -> StoreResult<()> {
        self.modify(owner, |records: &mut Vec<T>| {
            let idx = records
                .iter()
                .position(|existing| existing.id() == id)
                .ok_or(StoreError::Missing { kind: T::KIND, id })?;
            records.remove(idx);
            Ok(())
        })
    }
}
