use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{NamedEntity, Record};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// One entry in a stock item's append-only cost history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CostEntry {
    pub price: f64,
    pub date: DateTime<Utc>,
}

/// An inventory line. Quantity may go negative; the ledger does not enforce a floor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockItem {
    pub id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub cost_price: f64,
    pub selling_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub cost_history: Vec<CostEntry>,
}

impl StockItem {
    /// Creates an item whose cost history starts with its initial cost price.
    pub fn new(
        name: impl Into<String>,
        quantity: i64,
        cost_price: f64,
        selling_price: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            quantity,
            cost_price,
            selling_price,
            low_stock_threshold: None,
            last_updated: now,
            cost_history: vec![CostEntry {
                price: cost_price,
                date: now,
            }],
        }
    }

    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = Some(threshold);
        self
    }

    /// Threshold to compare against, falling back to `default` when the item has none.
    pub fn threshold_or(&self, default: i64) -> i64 {
        self.low_stock_threshold.unwrap_or(default)
    }

    /// Inclusive: an item sitting exactly on its threshold is low.
    pub fn is_low(&self, default_threshold: i64) -> bool {
        self.quantity <= self.threshold_or(default_threshold)
    }

    pub fn stock_value(&self) -> f64 {
        self.quantity as f64 * self.cost_price
    }

    /// Removes `quantity` units and stamps the item as updated at `now`.
    ///
    /// Returns the new quantity, or `None` without touching the item when the count
    /// would overflow.
    pub fn deplete(&mut self, quantity: i64, now: DateTime<Utc>) -> Option<i64> {
        let remaining = self.quantity.checked_sub(quantity)?;
        self.quantity = remaining;
        self.last_updated = now;
        Some(remaining)
    }

    /// Appends `(cost_price, now)` to the history when the cost differs from `previous_cost`.
    ///
    /// Returns whether an entry was appended.
    pub fn record_cost_change(&mut self, previous_cost: f64, now: DateTime<Utc>) -> bool {
        if self.cost_price == previous_cost {
            return false;
        }
        self.cost_history.push(CostEntry {
            price: self.cost_price,
            date: now,
        });
        true
    }
}

impl Record for StockItem {
    const KIND: &'static str = "stock";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for StockItem {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_seeds_cost_history() {
        let now = Utc::now();
        let item = StockItem::new("Widget", 10, 4.0, 6.0, now);
        assert_eq!(item.cost_history, vec![CostEntry { price: 4.0, date: now }]);
        assert_eq!(item.threshold_or(DEFAULT_LOW_STOCK_THRESHOLD), 5);
    }

    #[test]
    fn low_stock_boundary_is_inclusive() {
        let now = Utc::now();
        let at_threshold = StockItem::new("A", 5, 1.0, 2.0, now).with_threshold(5);
        let above = StockItem::new("B", 6, 1.0, 2.0, now).with_threshold(5);
        assert!(at_threshold.is_low(DEFAULT_LOW_STOCK_THRESHOLD));
        assert!(!above.is_low(DEFAULT_LOW_STOCK_THRESHOLD));
    }

    #[test]
    fn deplete_allows_negative_quantities() {
        let now = Utc::now();
        let mut item = StockItem::new("Widget", 1, 1.0, 2.0, now);
        assert_eq!(item.deplete(3, now), Some(-2));
        assert_eq!(item.quantity, -2);
    }

    #[test]
    fn deplete_refuses_to_overflow() {
        let created = Utc::now();
        let mut item = StockItem::new("Widget", -2, 1.0, 2.0, created);
        let before = item.clone();
        assert_eq!(item.deplete(i64::MAX, created + chrono::Duration::hours(1)), None);
        assert_eq!(item, before);
    }
}
