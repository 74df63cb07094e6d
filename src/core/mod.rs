pub mod coordinator;
pub mod time;
pub mod utils;

pub use coordinator::{LedgerCoordinator, SaleOutcome};
pub use time::{Clock, FixedClock, SystemClock};
