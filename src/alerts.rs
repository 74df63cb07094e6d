//! Actionable warnings derived from the current ledger state.
//!
//! Alerts are never stored. They are recomputed from the stock, debt, and expense
//! lists whenever any of those change, and the recomputation is a pure function of
//! its inputs plus the reference time.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::ledger::{
    is_due_soon, DebtRecord, ExpenseRecord, LedgerSnapshot, StockItem, DEFAULT_DUE_SOON_DAYS,
    DEFAULT_LOW_STOCK_THRESHOLD,
};

/// Thresholds applied when deriving alerts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertPolicy {
    /// Used for stock items that carry no threshold of their own.
    pub low_stock_threshold: i64,
    pub due_soon_days: f64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }
}

/// The three independent alert lists consumers read from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerAlerts {
    pub low_stock: Vec<StockItem>,
    pub due_soon_expenses: Vec<ExpenseRecord>,
    pub unpaid_debts: Vec<DebtRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertCounts {
    pub low_stock: usize,
    pub due_soon_expenses: usize,
    pub unpaid_debts: usize,
}

impl AlertCounts {
    pub fn total(&self) -> usize {
        self.low_stock + self.due_soon_expenses + self.unpaid_debts
    }
}

/// Which list an alert belongs to, and where a consumer navigates to act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    LowStock,
    DueSoonExpense,
    UnpaidDebt,
}

impl AlertKind {
    pub const ALL: [AlertKind; 3] = [
        AlertKind::LowStock,
        AlertKind::DueSoonExpense,
        AlertKind::UnpaidDebt,
    ];

    pub fn tab(&self) -> &'static str {
        match self {
            AlertKind::LowStock => "inventory",
            AlertKind::DueSoonExpense => "expenses",
            AlertKind::UnpaidDebt => "debts",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::LowStock => "Low stock",
            AlertKind::DueSoonExpense => "Bills due soon",
            AlertKind::UnpaidDebt => "Unpaid debts",
        }
    }
}

impl LedgerAlerts {
    pub fn counts(&self) -> AlertCounts {
        AlertCounts {
            low_stock: self.low_stock.len(),
            due_soon_expenses: self.due_soon_expenses.len(),
            unpaid_debts: self.unpaid_debts.len(),
        }
    }

    pub fn count(&self, kind: AlertKind) -> usize {
        match kind {
            AlertKind::LowStock => self.low_stock.len(),
            AlertKind::DueSoonExpense => self.due_soon_expenses.len(),
            AlertKind::UnpaidDebt => self.unpaid_debts.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.counts().total()
    }

    pub fn is_clear(&self) -> bool {
        self.total() == 0
    }

    /// Kinds with at least one alert, in display order.
    pub fn active_kinds(&self) -> Vec<AlertKind> {
        AlertKind::ALL
            .into_iter()
            .filter(|kind| self.count(*kind) > 0)
            .collect()
    }
}

pub fn compute_alerts(
    stock: &[StockItem],
    debts: &[DebtRecord],
    expenses: &[ExpenseRecord],
    now: DateTime<Utc>,
    policy: &AlertPolicy,
) -> LedgerAlerts {
    let low_stock = stock
        .iter()
        .filter(|item| item.is_low(policy.low_stock_threshold))
        .cloned()
        .collect();
    let due_soon_expenses = expenses
        .iter()
        .filter(|expense| {
            expense.frequency.is_recurring() && is_due_soon(expense, now, policy.due_soon_days)
        })
        .cloned()
        .collect();
    let unpaid_debts = debts.iter().filter(|debt| !debt.is_paid).cloned().collect();

    LedgerAlerts {
        low_stock,
        due_soon_expenses,
        unpaid_debts,
    }
}

pub fn alerts_for_snapshot(
    snapshot: &LedgerSnapshot,
    now: DateTime<Utc>,
    policy: &AlertPolicy,
) -> LedgerAlerts {
    compute_alerts(
        &snapshot.stock,
        &snapshot.debts,
        &snapshot.expenses,
        now,
        policy,
    )
}

#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    revision: u64,
    minute: i64,
    policy: AlertPolicy,
}

/// Remembers the last computed alerts for a snapshot revision.
///
/// The cached value is reused while the snapshot revision, the policy, and the
/// minute of the reference time are all unchanged.
#[derive(Debug, Default)]
pub struct AlertCache {
    key: Option<CacheKey>,
    alerts: LedgerAlerts,
}

impl AlertCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        snapshot: &LedgerSnapshot,
        now: DateTime<Utc>,
        policy: &AlertPolicy,
    ) -> &LedgerAlerts {
        let key = CacheKey {
            revision: snapshot.revision(),
            minute: now.timestamp().div_euclid(60),
            policy: *policy,
        };
        if self.key.as_ref() != Some(&key) {
            self.alerts = alerts_for_snapshot(snapshot, now, policy);
            debug!(
                revision = key.revision,
                total = self.alerts.total(),
                "recomputed ledger alerts"
            );
            self.key = Some(key);
        }
        &self.alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Frequency;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn low_stock_boundary_is_inclusive() {
        let stock = vec![
            StockItem::new("At", 5, 1.0, 2.0, now()).with_threshold(5),
            StockItem::new("Above", 6, 1.0, 2.0, now()).with_threshold(5),
        ];
        let alerts = compute_alerts(&stock, &[], &[], now(), &AlertPolicy::default());
        assert_eq!(alerts.low_stock.len(), 1);
        assert_eq!(alerts.low_stock[0].name, "At");
    }

    #[test]
    fn missing_threshold_falls_back_to_policy() {
        let stock = vec![StockItem::new("Widget", 5, 1.0, 2.0, now())];
        let strict = AlertPolicy {
            low_stock_threshold: 2,
            ..AlertPolicy::default()
        };
        assert_eq!(
            compute_alerts(&stock, &[], &[], now(), &AlertPolicy::default())
                .low_stock
                .len(),
            1
        );
        assert!(compute_alerts(&stock, &[], &[], now(), &strict)
            .low_stock
            .is_empty());
    }

    #[test]
    fn lists_are_independent() {
        let mut paid = DebtRecord::new("Paid", 10.0, now());
        paid.is_paid = true;
        let debts = vec![paid, DebtRecord::new("Owes", 20.0, now())];
        let expenses = vec![
            ExpenseRecord::new("Rent", 900.0, now() - Duration::days(26))
                .recurring(Frequency::Weekly),
            ExpenseRecord::new("Lunch", 12.0, now() - Duration::hours(1)),
        ];
        let alerts = compute_alerts(&[], &debts, &expenses, now(), &AlertPolicy::default());
        assert_eq!(
            alerts.counts(),
            AlertCounts {
                low_stock: 0,
                due_soon_expenses: 1,
                unpaid_debts: 1,
            }
        );
        assert_eq!(
            alerts.active_kinds(),
            vec![AlertKind::DueSoonExpense, AlertKind::UnpaidDebt]
        );
        assert_eq!(alerts.unpaid_debts[0].debtor_name, "Owes");
    }

    #[test]
    fn cache_recomputes_on_new_revision() {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.debts.push(DebtRecord::new("Jane", 5.0, now()));
        let mut cache = AlertCache::new();
        let policy = AlertPolicy::default();
        assert_eq!(cache.get(&snapshot, now(), &policy).unpaid_debts.len(), 1);

        // Same revision: the stale value is served.
        snapshot.debts.clear();
        assert_eq!(cache.get(&snapshot, now(), &policy).unpaid_debts.len(), 1);

        snapshot.bump_revision();
        assert!(cache.get(&snapshot, now(), &policy).is_clear());
    }
}
