#![doc(test(attr(deny(warnings))))]

//! Shop Ledger keeps sales, stock, debts, and expenses consistent with each other and
//! derives the alerts a small shop owner needs to act on.

pub mod alerts;
pub mod auth;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod reminder;
pub mod scheduler;
pub mod storage;
pub mod summary;
pub mod utils;

use std::sync::Once;

pub use crate::core::{LedgerCoordinator, SaleOutcome};
pub use errors::{LedgerError, LedgerResult};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Shop ledger tracing initialized.");
    });
}
