//! Persistence collaborator consumed by the coordinator.
//!
//! The engine only needs a reliable keyed store per entity, scoped to the owning
//! user. Every call may fail; callers never retry.

pub mod json_backend;
pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::ledger::{DebtRecord, ExpenseRecord, Record, SaleRecord, StockItem};

pub use json_backend::JsonStore;
pub use memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("{kind} {id} does not exist in the store")]
    Missing { kind: &'static str, id: Uuid },
    #[error("{kind} {id} already exists in the store")]
    Duplicate { kind: &'static str, id: Uuid },
}

/// Identifies the user whose records a store call reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(owner: impl Into<String>) -> Self {
        Self(owner.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self("default".into())
    }
}

/// Keyed CRUD over one entity type, scoped by owner.
pub trait RecordStore<T: Record>: Send + Sync {
    fn list(&self, owner: &OwnerId) -> StoreResult<Vec<T>>;
    fn create(&self, owner: &OwnerId, record: &T) -> StoreResult<()>;
    fn update(&self, owner: &OwnerId, record: &T) -> StoreResult<()>;
    fn delete(&self, owner: &OwnerId, id: Uuid) -> StoreResult<()>;
}

/// A store able to hold all four ledger entity types.
pub trait LedgerStore:
    RecordStore<SaleRecord>
    + RecordStore<StockItem>
    + RecordStore<DebtRecord>
    + RecordStore<ExpenseRecord>
{
}

impl<S> LedgerStore for S where
    S: RecordStore<SaleRecord>
        + RecordStore<StockItem>
        + RecordStore<DebtRecord>
        + RecordStore<ExpenseRecord>
{
}
