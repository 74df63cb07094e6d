use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::Record;
use super::frequency::Frequency;

/// A business expense. `timestamp` doubles as the recurrence anchor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub frequency: Frequency,
}

impl ExpenseRecord {
    pub fn new(category: impl Into<String>, amount: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            amount,
            description: String::new(),
            timestamp,
            frequency: Frequency::None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn recurring(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn anchor(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Record for ExpenseRecord {
    const KIND: &'static str = "expense";

    fn id(&self) -> Uuid {
        self.id
    }
}
