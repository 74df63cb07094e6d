use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{NamedEntity, Record};
use super::sale::SaleRecord;

/// Money owed to the business by a customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebtRecord {
    pub id: Uuid,
    pub debtor_name: String,
    #[serde(default)]
    pub phone: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_paid: bool,
    pub timestamp: DateTime<Utc>,
}

impl DebtRecord {
    pub fn new(debtor_name: impl Into<String>, amount: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            debtor_name: debtor_name.into(),
            phone: String::new(),
            amount,
            description: String::new(),
            is_paid: false,
            timestamp,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builds the unpaid debt a credit sale opens, or `None` when the sale carries no credit.
    pub fn from_credit_sale(sale: &SaleRecord) -> Option<Self> {
        let (customer, balance) = sale.credit_terms()?;
        let description = format!(
            "Credit sale: {} x {} @ {:.2}",
            sale.quantity, sale.item_name, sale.unit_price
        );
        Some(
            DebtRecord::new(customer, balance, sale.timestamp)
                .with_phone(sale.customer_phone.clone().unwrap_or_default())
                .with_description(description),
        )
    }
}

impl Record for DebtRecord {
    const KIND: &'static str = "debt";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for DebtRecord {
    fn name(&self) -> &str {
        &self.debtor_name
    }
}
