use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{NamedEntity, Record};

/// A completed sale. Sales are never edited once recorded; only deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleRecord {
    pub id: Uuid,
    pub item_name: String,
    #[serde(default)]
    pub category: String,
    pub quantity: i64,
    pub unit_price: f64,
    #[serde(default)]
    pub unit_cost: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_on_credit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
}

impl SaleRecord {
    /// Creates a cash sale stamped with `timestamp`.
    pub fn new(
        item_name: impl Into<String>,
        quantity: i64,
        unit_price: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_name: item_name.into(),
            category: String::new(),
            quantity,
            unit_price,
            unit_cost: 0.0,
            timestamp,
            is_on_credit: false,
            balance: None,
            customer_name: None,
            customer_phone: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_unit_cost(mut self, unit_cost: f64) -> Self {
        self.unit_cost = unit_cost;
        self
    }

    /// Marks the sale as sold on credit with an outstanding `balance` owed by the customer.
    pub fn on_credit(
        mut self,
        balance: f64,
        customer_name: impl Into<String>,
        customer_phone: Option<String>,
    ) -> Self {
        self.is_on_credit = true;
        self.balance = Some(balance);
        self.customer_name = Some(customer_name.into());
        self.customer_phone = customer_phone;
        self
    }

    pub fn revenue(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }

    pub fn cost(&self) -> f64 {
        self.quantity as f64 * self.unit_cost
    }

    pub fn profit(&self) -> f64 {
        self.revenue() - self.cost()
    }

    /// Returns the customer and balance when this sale must open a debt.
    ///
    /// Requires the credit flag, a strictly positive balance, and a non-empty customer name.
    pub fn credit_terms(&self) -> Option<(&str, f64)> {
        if !self.is_on_credit {
            return None;
        }
        let balance = self.balance.filter(|amount| *amount > 0.0)?;
        let customer = self
            .customer_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())?;
        Some((customer, balance))
    }
}

impl Record for SaleRecord {
    const KIND: &'static str = "sale";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for SaleRecord {
    fn name(&self) -> &str {
        &self.item_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_terms_require_every_condition() {
        let now = Utc::now();
        let cash = SaleRecord::new("Widget", 1, 10.0, now);
        assert!(cash.credit_terms().is_none());

        let credit = cash.clone().on_credit(50.0, "Jane", None);
        assert_eq!(credit.credit_terms(), Some(("Jane", 50.0)));

        let zero_balance = cash.clone().on_credit(0.0, "Jane", None);
        assert!(zero_balance.credit_terms().is_none());

        let nameless = cash.on_credit(25.0, "  ", None);
        assert!(nameless.credit_terms().is_none());
    }

    #[test]
    fn profit_uses_unit_cost() {
        let sale = SaleRecord::new("Widget", 3, 12.0, Utc::now()).with_unit_cost(8.0);
        assert_eq!(sale.revenue(), 36.0);
        assert_eq!(sale.profit(), 12.0);
    }
}
