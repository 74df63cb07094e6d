//! Projection of recurring expenses onto the calendar.
//!
//! Nothing here is stored: due dates are derived from each expense's anchor and
//! frequency every time they are needed, so these functions are free of side effects
//! and safe to call on every poll.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::expense::ExpenseRecord;
use super::frequency::Frequency;

pub const DEFAULT_DUE_SOON_DAYS: f64 = 3.0;
/// A bill that passed its due minute earlier today is still reported as due.
const GRACE_DAYS: f64 = 1.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Next time an obligation anchored at `anchor` falls due after `now`.
///
/// An anchor still in the future is its own next occurrence. `None` means "never",
/// either because the frequency is [`Frequency::None`] or because the projection
/// leaves the representable calendar.
pub fn next_occurrence(
    anchor: DateTime<Utc>,
    frequency: Frequency,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if !frequency.is_recurring() {
        return None;
    }
    if anchor > now {
        return Some(anchor);
    }
    let mut steps = frequency.periods_elapsed(anchor, now);
    loop {
        let candidate = frequency.advance(anchor, steps)?;
        if candidate > now {
            return Some(candidate);
        }
        steps = steps.checked_add(1)?;
    }
}

/// Fractional days from `now` until the expense next falls due.
pub fn days_until_due(expense: &ExpenseRecord, now: DateTime<Utc>) -> Option<f64> {
    let next = next_occurrence(expense.anchor(), expense.frequency, now)?;
    Some((next - now).num_milliseconds() as f64 / MILLIS_PER_DAY)
}

/// Whether a recurring expense falls due within `threshold_days` of `now`.
pub fn is_due_soon(expense: &ExpenseRecord, now: DateTime<Utc>, threshold_days: f64) -> bool {
    if !expense.frequency.is_recurring() {
        return false;
    }
    match days_until_due(expense, now) {
        Some(days) => days <= threshold_days && days >= -GRACE_DAYS,
        None => false,
    }
}

/// Read-only view of where a recurring expense stands relative to a reference time.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceSnapshot {
    pub expense_id: Uuid,
    pub category: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub next_due: DateTime<Utc>,
    pub days_until: f64,
    pub due_soon: bool,
}

/// Projects every recurring expense, ordered by next due date.
pub fn snapshot_recurrences(
    expenses: &[ExpenseRecord],
    now: DateTime<Utc>,
    threshold_days: f64,
) -> Vec<RecurrenceSnapshot> {
    let mut snapshots: Vec<_> = expenses
        .iter()
        .filter_map(|expense| {
            let next_due = next_occurrence(expense.anchor(), expense.frequency, now)?;
            let days_until = (next_due - now).num_milliseconds() as f64 / MILLIS_PER_DAY;
            Some(RecurrenceSnapshot {
                expense_id: expense.id,
                category: expense.category.clone(),
                amount: expense.amount,
                frequency: expense.frequency,
                next_due,
                days_until,
                due_soon: days_until <= threshold_days && days_until >= -GRACE_DAYS,
            })
        })
        .collect();
    snapshots.sort_by_key(|snap| (snap.next_due, snap.expense_id));
    snapshots
}
