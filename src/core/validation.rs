//! Entry-form validation for new and edited records.
//!
//! Validation happens before any record is built; the aggregation code never
//! sees an invalid amount or an empty required field.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::expense::normalize_tags;
use crate::domain::{NewExpense, NewIncome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Amount,
    Source,
    Title,
    Category,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormField::Amount => "amount",
            FormField::Source => "source",
            FormField::Title => "title",
            FormField::Category => "category",
        };
        f.write_str(label)
    }
}

/// Field-level messages collected from one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<FormField, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: FormField, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: FormField, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.fields.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.fields.values().map(String::as_str).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub const INVALID_AMOUNT: &str = "Please enter a valid amount";
pub const MISSING_SOURCE: &str = "Please enter an income source";
pub const MISSING_TITLE: &str = "Please enter a title for this expense";
pub const MISSING_CATEGORY: &str = "Please select a category";

/// Parses user-typed amount text; `None` for empty, non-numeric, non-finite or
/// non-positive input.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

/// Raw income entry as typed by the user.
#[derive(Debug, Clone)]
pub struct IncomeForm {
    pub amount: String,
    pub source: String,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl IncomeForm {
    pub fn validate(&self) -> Result<NewIncome, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let amount = parse_amount(&self.amount);
        if amount.is_none() {
            errors.add(FormField::Amount, INVALID_AMOUNT);
        }
        let source = self.source.trim();
        if source.is_empty() {
            errors.add(FormField::Source, MISSING_SOURCE);
        }
        errors.into_result(|| NewIncome {
            amount: amount.unwrap_or_default(),
            source: source.to_string(),
            date: self.date,
            notes: self.notes.clone(),
        })
    }
}

/// Raw expense entry as typed by the user.
#[derive(Debug, Clone)]
pub struct ExpenseForm {
    pub amount: String,
    pub title: String,
    pub category: String,
    pub date: DateTime<Utc>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

impl ExpenseForm {
    pub fn validate(&self) -> Result<NewExpense, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let amount = parse_amount(&self.amount);
        if amount.is_none() {
            errors.add(FormField::Amount, INVALID_AMOUNT);
        }
        let title = self.title.trim();
        if title.is_empty() {
            errors.add(FormField::Title, MISSING_TITLE);
        }
        if self.category.is_empty() {
            errors.add(FormField::Category, MISSING_CATEGORY);
        }
        errors.into_result(|| NewExpense {
            amount: amount.unwrap_or_default(),
            title: title.to_string(),
            category: self.category.clone(),
            date: self.date,
            tags: normalize_tags(self.tags.iter().cloned()),
            notes: self.notes.clone(),
        })
    }
}

/// Category names must contain something other than whitespace.
pub fn validate_category_name(name: &str) -> Result<(), ValidationErrors> {
    if name.trim().is_empty() {
        return Err(ValidationErrors::single(
            FormField::Category,
            "Please enter a category name",
        ));
    }
    Ok(())
}
