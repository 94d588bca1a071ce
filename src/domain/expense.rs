//! Expense records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// A single dated outflow of money, classified by category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub title: String,
    pub category: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Expense {
    pub fn new(
        amount: f64,
        title: impl Into<String>,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        NewExpense {
            amount,
            title: title.into(),
            category: category.into(),
            date,
            tags: Vec::new(),
            notes: None,
        }
        .into_record(new_record_id())
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = normalize_tags(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = normalize_notes(Some(notes.into()));
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|existing| existing == tag)
    }
}

/// Validated expense fields awaiting an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: f64,
    pub title: String,
    pub category: String,
    pub date: DateTime<Utc>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

impl NewExpense {
    pub fn into_record(self, id: String) -> Expense {
        Expense {
            id,
            amount: self.amount,
            title: self.title,
            category: self.category,
            date: self.date,
            tags: normalize_tags(self.tags),
            notes: normalize_notes(self.notes),
        }
    }
}

/// Trims tags, drops blanks and exact duplicates while keeping display order.
pub fn normalize_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() || out.iter().any(|seen| seen == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}

impl Identifiable for Expense {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Dated for Expense {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

impl Amounted for Expense {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        format!("expense:{} [{} / {}]", self.id, self.title, self.category)
    }
}
