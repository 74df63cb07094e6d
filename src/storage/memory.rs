use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use serde_json::Value;
use uuid::Uuid;

use super::{OwnerId, RecordStore, StoreError, StoreResult};
use crate::ledger::Record;

type Table = Vec<(Uuid, Value)>;

/// Thread-safe in-memory store. Records are kept as JSON documents in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<(OwnerId, &'static str), Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, HashMap<(OwnerId, &'static str), Table>>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl<T: Record> RecordStore<T> for MemoryStore {
    fn list(&self, owner: &OwnerId) -> StoreResult<Vec<T>> {
        let tables = self.tables()?;
        let Some(table) = tables.get(&(owner.clone(), T::KIND)) else {
            return Ok(Vec::new());
        };
        table
            .iter()
            .map(|(_, doc)| serde_json::from_value(doc.clone()).map_err(StoreError::from))
            .collect()
    }

    fn create(&self, owner: &OwnerId, record: &T) -> StoreResult<()> {
        let doc = serde_json::to_value(record)?;
        let mut tables = self.tables()?;
        let table = tables.entry((owner.clone(), T::KIND)).or_default();
        if table.iter().any(|(id, _)| *id == record.id()) {
            return Err(StoreError::Duplicate {
                kind: T::KIND,
                id: record.id(),
            });
        }
        table.push((record.id(), doc));
        Ok(())
    }

    fn update(&self, owner: &OwnerId, record: &T) -> StoreResult<()> {
        let doc = serde_json::to_value(record)?;
        let mut tables = self.tables()?;
        let slot = tables
            .get_mut(&(owner.clone(), T::KIND))
            .and_then(|table| table.iter_mut().find(|(id, _)| *id == record.id()))
            .ok_or(StoreError::Missing {
                kind: T::KIND,
                id: record.id(),
            })?;
        slot.1 = doc;
        Ok(())
    }

    fn delete(&self, owner: &OwnerId, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables()?;
        let table = tables
            .get_mut(&(owner.clone(), T::KIND))
            .ok_or(StoreError::Missing { kind: T::KIND, id })?;
        let idx = table
            .iter()
            .position(|(existing, _)| *existing == id)
            .ok_or(StoreError::Missing { kind: T::KIND, id })?;
        table.remove(idx);
        Ok(())
    }
}
