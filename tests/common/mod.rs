#![allow(dead_code)]

use std::{
    collections::HashSet,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use shop_ledger::{
    core::{FixedClock, LedgerCoordinator},
    ledger::Record,
    storage::{MemoryStore, OwnerId, RecordStore, StoreError, StoreResult},
};
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 9, 30, 0).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    Update,
    Delete,
}

/// Memory store that fails chosen `(kind, op)` calls with `StoreError::Unavailable`.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    failures: Mutex<HashSet<(&'static str, Op)>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, kind: &'static str, op: Op) {
        self.failures.lock().unwrap().insert((kind, op));
    }

    pub fn heal(&self) {
        self.failures.lock().unwrap().clear();
    }

    fn check(&self, kind: &'static str, op: Op) -> StoreResult<()> {
        if self.failures.lock().unwrap().contains(&(kind, op)) {
            return Err(StoreError::Unavailable(format!("{kind} {op:?} rejected")));
        }
        Ok(())
    }
}

impl<T: Record> RecordStore<T> for FailingStore {
    fn list(&self, owner: &OwnerId) -> StoreResult<Vec<T>> {
        self.check(T::KIND, Op::List)?;
        RecordStore::<T>::list(&self.inner, owner)
    }

    fn create(&self, owner: &OwnerId, record: &T) -> StoreResult<()> {
        self.check(T::KIND, Op::Create)?;
        RecordStore::<T>::create(&self.inner, owner, record)
    }

    fn update(&self, owner: &OwnerId, record: &T) -> StoreResult<()> {
        self.check(T::KIND, Op::Update)?;
        RecordStore::<T>::update(&self.inner, owner, record)
    }

    fn delete(&self, owner: &OwnerId, id: Uuid) -> StoreResult<()> {
        self.check(T::KIND, Op::Delete)?;
        RecordStore::<T>::delete(&self.inner, owner, id)
    }
}

pub fn shop() -> OwnerId {
    OwnerId::new("shop")
}

pub struct Harness {
    pub coordinator: LedgerCoordinator,
    pub store: Arc<FailingStore>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    /// What the store holds for the harness owner, bypassing the coordinator's mirror.
    pub fn stored<T: Record>(&self) -> Vec<T> {
        RecordStore::<T>::list(self.store.as_ref(), &shop()).expect("list stored records")
    }
}

pub fn harness() -> Harness {
    let store = Arc::new(FailingStore::new());
    let clock = Arc::new(FixedClock::new(reference_now()));
    let coordinator = LedgerCoordinator::new(store.clone(), shop(), clock.clone());
    Harness {
        coordinator,
        store,
        clock,
    }
}
