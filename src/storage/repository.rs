//! Typed access to the record collections kept in a [`KeyValueStore`].
//!
//! Reads never fail: a missing, unreadable or corrupt collection is logged and
//! treated as empty (categories fall back to the defaults). Writes surface
//! their errors so callers can keep in-memory state untouched.

use serde::{de::DeserializeOwned, Serialize};

use crate::currency::DisplaySettings;
use crate::domain::{CategorySet, Expense, Identifiable, Income};
use crate::errors::Result;

use super::{KeyValueStore, StoreKey};

pub const DEFAULT_NAMESPACE: &str = "moneyflow";

#[derive(Debug)]
pub struct FinanceStore<S> {
    backend: S,
    namespace: String,
}

impl<S: KeyValueStore> FinanceStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_namespace(backend, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(backend: S, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self, key: StoreKey) -> String {
        key.physical(&self.namespace)
    }

    /// Seeds the category list with the defaults on first run.
    pub fn initialize(&self) -> Result<()> {
        let key = self.key(StoreKey::Categories);
        if self.backend.get(&key)?.is_none() {
            tracing::info!(key = %key, "seeding default categories");
            self.save_categories(&CategorySet::default())?;
        }
        Ok(())
    }

    pub fn income(&self) -> Vec<Income> {
        self.read_or(StoreKey::Income, Vec::new)
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.read_or(StoreKey::Expenses, Vec::new)
    }

    pub fn categories(&self) -> CategorySet {
        self.read_or(StoreKey::Categories, CategorySet::default)
    }

    /// `None` until display settings have been saved once.
    pub fn settings(&self) -> Option<DisplaySettings> {
        self.read_or(StoreKey::Settings, || None)
    }

    pub fn save_settings(&self, settings: &DisplaySettings) -> Result<()> {
        self.write(StoreKey::Settings, settings)
    }

    pub fn save_income(&self, income: &[Income]) -> Result<()> {
        self.write(StoreKey::Income, &income)
    }

    pub fn save_expenses(&self, expenses: &[Expense]) -> Result<()> {
        self.write(StoreKey::Expenses, &expenses)
    }

    pub fn save_categories(&self, categories: &CategorySet) -> Result<()> {
        self.write(StoreKey::Categories, categories)
    }

    pub fn add_income(&self, record: Income) -> Result<()> {
        let mut income = self.income();
        income.push(record);
        self.save_income(&income)
    }

    pub fn add_expense(&self, record: Expense) -> Result<()> {
        let mut expenses = self.expenses();
        expenses.push(record);
        self.save_expenses(&expenses)
    }

    /// Returns `false` when no record carried the id; nothing is written then.
    pub fn delete_income(&self, id: &str) -> Result<bool> {
        let mut income = self.income();
        if !remove_by_id(&mut income, id) {
            return Ok(false);
        }
        self.save_income(&income)?;
        Ok(true)
    }

    pub fn delete_expense(&self, id: &str) -> Result<bool> {
        let mut expenses = self.expenses();
        if !remove_by_id(&mut expenses, id) {
            return Ok(false);
        }
        self.save_expenses(&expenses)?;
        Ok(true)
    }

    /// Appends the name unless it is already present.
    pub fn add_category(&self, name: &str) -> Result<bool> {
        let mut categories = self.categories();
        if !categories.insert(name) {
            return Ok(false);
        }
        self.save_categories(&categories)?;
        Ok(true)
    }

    fn read_or<T, F>(&self, key: StoreKey, fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let physical = self.key(key);
        let raw = match self.backend.get(&physical) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback(),
            Err(err) => {
                tracing::error!(key = %physical, error = %err, "failed to read collection");
                return fallback();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key = %physical, error = %err, "discarding unreadable collection");
                fallback()
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<()> {
        let physical = self.key(key);
        let json = serde_json::to_string(value)?;
        if let Err(err) = self.backend.set(&physical, &json) {
            tracing::error!(key = %physical, error = %err, "failed to write collection");
            return Err(err.into());
        }
        tracing::debug!(key = %physical, bytes = json.len(), "collection written");
        Ok(())
    }
}

fn remove_by_id<T: Identifiable>(records: &mut Vec<T>, id: &str) -> bool {
    let before = records.len();
    records.retain(|record| record.id() != id);
    records.len() != before
}
