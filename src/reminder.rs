//! Periodic reminders built from the current alert lists.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tracing::{debug, warn};

use crate::{
    alerts::{AlertKind, LedgerAlerts},
    errors::LedgerResult,
    scheduler::{Scheduler, TimerHandle},
};

const TIMER_NAME: &str = "ledger-reminder";

/// Destination for reminder messages (notification center, log, chat bot).
pub trait ReminderSink: Send {
    fn deliver(&mut self, message: &str) -> LedgerResult<()>;
}

/// Sink that keeps every delivered message in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReminderSink for CollectingSink {
    fn deliver(&mut self, message: &str) -> LedgerResult<()> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReminderJob;

impl ReminderJob {
    /// Text summarizing the active alerts, or `None` when there is nothing to act on.
    pub fn message(alerts: &LedgerAlerts) -> Option<String> {
        if alerts.is_clear() {
            return None;
        }
        let parts: Vec<String> = alerts
            .active_kinds()
            .into_iter()
            .map(|kind| describe(kind, alerts.count(kind)))
            .collect();
        Some(format!("Ledger needs attention: {}.", parts.join(", ")))
    }

    /// Registers a repeating reminder on `scheduler`.
    ///
    /// `alerts` is polled on every tick; the job reads alerts only and never mutates the
    /// ledger. Cancel the returned handle to stop reminding.
    pub fn schedule<S, F>(
        scheduler: &dyn Scheduler,
        interval: Duration,
        mut alerts: F,
        mut sink: S,
    ) -> TimerHandle
    where
        S: ReminderSink + 'static,
        F: FnMut() -> LedgerAlerts + Send + 'static,
    {
        scheduler.schedule_repeating(
            TIMER_NAME,
            interval,
            Box::new(move || {
                let current = alerts();
                match Self::message(&current) {
                    Some(message) => {
                        if let Err(err) = sink.deliver(&message) {
                            warn!(error = %err, "failed to deliver ledger reminder");
                        }
                    }
                    None => debug!("no ledger alerts, reminder skipped"),
                }
            }),
        )
    }
}

fn describe(kind: AlertKind, count: usize) -> String {
    let noun = match (kind, count == 1) {
        (AlertKind::LowStock, true) => "item low on stock",
        (AlertKind::LowStock, false) => "items low on stock",
        (AlertKind::DueSoonExpense, true) => "expense due soon",
        (AlertKind::DueSoonExpense, false) => "expenses due soon",
        (AlertKind::UnpaidDebt, true) => "unpaid debt",
        (AlertKind::UnpaidDebt, false) => "unpaid debts",
    };
    format!("{count} {noun}")
}
