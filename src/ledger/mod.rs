//! Ledger records, recurrence projection, and the snapshot they form together.

pub mod common;
pub mod debt;
pub mod expense;
pub mod frequency;
pub mod recurring;
pub mod sale;
pub mod snapshot;
pub mod stock;

pub use common::{closest_name, names_match, positions_named, NamedEntity, Record};
pub use debt::DebtRecord;
pub use expense::ExpenseRecord;
pub use frequency::Frequency;
pub use recurring::{
    days_until_due, is_due_soon, next_occurrence, snapshot_recurrences, RecurrenceSnapshot,
    DEFAULT_DUE_SOON_DAYS,
};
pub use sale::SaleRecord;
pub use snapshot::{LedgerSnapshot, Mirrored};
pub use stock::{CostEntry, StockItem, DEFAULT_LOW_STOCK_THRESHOLD};
