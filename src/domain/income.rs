//! Income records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// A single dated inflow of money.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Income {
    pub id: String,
    pub amount: f64,
    pub source: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Income {
    pub fn new(amount: f64, source: impl Into<String>, date: DateTime<Utc>) -> Self {
        NewIncome {
            amount,
            source: source.into(),
            date,
            notes: None,
        }
        .into_record(new_record_id())
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = normalize_notes(Some(notes.into()));
        self
    }
}

/// Validated income fields awaiting an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncome {
    pub amount: f64,
    pub source: String,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl NewIncome {
    pub fn into_record(self, id: String) -> Income {
        Income {
            id,
            amount: self.amount,
            source: self.source,
            date: self.date,
            notes: normalize_notes(self.notes),
        }
    }
}

impl Identifiable for Income {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Dated for Income {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

impl Amounted for Income {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for Income {
    fn display_label(&self) -> String {
        format!("income:{} [{}]", self.id, self.source)
    }
}
