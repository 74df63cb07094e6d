use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ledger::LedgerSnapshot;

/// Headline totals for a dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub revenue: f64,
    pub cost_of_goods: f64,
    pub gross_profit: f64,
    pub expenses: f64,
    pub net_profit: f64,
    pub outstanding_debt: f64,
    pub stock_value: f64,
    pub sales_count: usize,
}

impl LedgerSummary {
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Self {
        Self::collect(snapshot, |_| true)
    }

    /// Totals for sales and expenses stamped within `[start, end)`.
    ///
    /// Outstanding debt and stock value describe the current position and ignore the
    /// window.
    pub fn for_window(snapshot: &LedgerSnapshot, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::collect(snapshot, |at| at >= start && at < end)
    }

    fn collect<F>(snapshot: &LedgerSnapshot, in_window: F) -> Self
    where
        F: Fn(DateTime<Utc>) -> bool,
    {
        let sales = snapshot.sales.iter().filter(|sale| in_window(sale.timestamp));
        let (revenue, cost_of_goods, sales_count) = sales.fold((0.0, 0.0, 0), |acc, sale| {
            (acc.0 + sale.revenue(), acc.1 + sale.cost(), acc.2 + 1)
        });
        let expenses: f64 = snapshot
            .expenses
            .iter()
            .filter(|expense| in_window(expense.timestamp))
            .map(|expense| expense.amount)
            .sum();
        let outstanding_debt = snapshot
            .debts
            .iter()
            .filter(|debt| !debt.is_paid)
            .map(|debt| debt.amount)
            .sum();
        let stock_value = snapshot.stock.iter().map(|item| item.stock_value()).sum();
        let gross_profit = revenue - cost_of_goods;

        Self {
            revenue,
            cost_of_goods,
            gross_profit,
            expenses,
            net_profit: gross_profit - expenses,
            outstanding_debt,
            stock_value,
            sales_count,
        }
    }
}
