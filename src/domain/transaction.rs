//! Kind-tagged views over income and expense records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::*;
use crate::domain::{Expense, Income};

/// Distinguishes the two record collections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        };
        f.write_str(label)
    }
}

/// Borrowed record of either kind, used for combined listings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transaction<'a> {
    Income(&'a Income),
    Expense(&'a Expense),
}

impl<'a> Transaction<'a> {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Income(_) => TransactionKind::Income,
            Transaction::Expense(_) => TransactionKind::Expense,
        }
    }

    /// Source for income, title for expenses.
    pub fn label(&self) -> &'a str {
        match *self {
            Transaction::Income(income) => &income.source,
            Transaction::Expense(expense) => &expense.title,
        }
    }

    pub fn notes(&self) -> Option<&'a str> {
        match *self {
            Transaction::Income(income) => income.notes.as_deref(),
            Transaction::Expense(expense) => expense.notes.as_deref(),
        }
    }
}

impl Identifiable for Transaction<'_> {
    fn id(&self) -> &str {
        match self {
            Transaction::Income(income) => &income.id,
            Transaction::Expense(expense) => &expense.id,
        }
    }
}

impl Dated for Transaction<'_> {
    fn date(&self) -> DateTime<Utc> {
        match self {
            Transaction::Income(income) => income.date,
            Transaction::Expense(expense) => expense.date,
        }
    }
}

impl Amounted for Transaction<'_> {
    fn amount(&self) -> f64 {
        match self {
            Transaction::Income(income) => income.amount,
            Transaction::Expense(expense) => expense.amount,
        }
    }
}

impl Displayable for Transaction<'_> {
    fn display_label(&self) -> String {
        match self {
            Transaction::Income(income) => income.display_label(),
            Transaction::Expense(expense) => expense.display_label(),
        }
    }
}
