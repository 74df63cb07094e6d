use thiserror::Error;
use uuid::Uuid;

use crate::storage::StoreError;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error type that captures every way a ledger intent can fail.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Authorization denied: {0}")]
    Authorization(String),
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, LedgerError::Authorization(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, LedgerError::Persistence(_))
    }
}

/// Rejections raised before any persistence call is made.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("No stock item named `{name}`{}", suggestion_hint(.suggestion))]
    UnknownStockItem {
        name: String,
        suggestion: Option<String>,
    },
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },
    #[error("Sale quantity must be positive, got {0}")]
    InvalidQuantity(i64),
    #[error("Selling {quantity} of `{name}` would overflow its stock count")]
    StockOverflow { name: String, quantity: i64 },
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean `{}`?)", name),
        None => String::new(),
    }
}
