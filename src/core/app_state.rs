use std::path::Path;

use chrono::{DateTime, TimeZone};

use crate::config::Config;
use crate::core::aggregation::{expenses_by_category, top_categories, CategoryTotal};
use crate::core::recurrence::recurring_expenses;
use crate::core::reports::{monthly_trend, MonthlySummary, MonthlyTotals};
use crate::core::suggestions::{generate_suggestions, Suggestion};
use crate::core::validation::validate_category_name;
use crate::currency::DisplaySettings;
use crate::domain::common::new_record_id;
use crate::domain::{
    CategorySet, Displayable, Expense, Identifiable, Income, NewExpense, NewIncome, Transaction,
    TransactionKind,
};
use crate::errors::{FinanceError, Result};
use crate::storage::{FinanceStore, JsonFileStore, KeyValueStore};

/// Outcome of looking a record up by kind and id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Found(Transaction<'a>),
    NotFound,
}

impl<'a> Lookup<'a> {
    pub fn found(self) -> Option<Transaction<'a>> {
        match self {
            Lookup::Found(txn) => Some(txn),
            Lookup::NotFound => None,
        }
    }
}

/// In-memory copy of every collection plus the store backing it.
///
/// Mutations build the next collection, persist it, and only then replace the
/// in-memory copy; a failed write leaves the state exactly as it was.
pub struct AppState<S> {
    store: FinanceStore<S>,
    income: Vec<Income>,
    expenses: Vec<Expense>,
    categories: CategorySet,
    settings: DisplaySettings,
}

impl AppState<JsonFileStore> {
    /// Opens the on-disk store described by `config`, rooted at `base` unless
    /// the config overrides the data directory.
    pub fn from_config(config: &Config, base: &Path) -> Result<Self> {
        let dir = config.resolve_data_dir(base);
        let backend = JsonFileStore::new(&dir, Some(config.backup_retention))?;
        tracing::info!(dir = %dir.display(), namespace = %config.key_namespace, "opening record store");
        let store = FinanceStore::with_namespace(backend, config.key_namespace.clone());
        Ok(Self::open_with_settings(store, config.display_settings()))
    }
}

impl<S: KeyValueStore> AppState<S> {
    pub fn open(store: FinanceStore<S>) -> Self {
        Self::open_with_settings(store, DisplaySettings::default())
    }

    /// Like [`AppState::open`]; `fallback` applies until settings are saved.
    pub fn open_with_settings(store: FinanceStore<S>, fallback: DisplaySettings) -> Self {
        if let Err(err) = store.initialize() {
            tracing::warn!(error = %err, "store initialization failed; continuing with defaults");
        }
        let mut state = Self {
            store,
            income: Vec::new(),
            expenses: Vec::new(),
            categories: CategorySet::default(),
            settings: fallback,
        };
        state.refresh();
        state
    }

    /// Reloads every collection from the store.
    pub fn refresh(&mut self) {
        self.income = self.store.income();
        self.expenses = self.store.expenses();
        self.categories = self.store.categories();
        if let Some(settings) = self.store.settings() {
            self.settings = settings;
        }
        tracing::debug!(
            income = self.income.len(),
            expenses = self.expenses.len(),
            categories = self.categories.len(),
            "state refreshed"
        );
    }

    pub fn store(&self) -> &FinanceStore<S> {
        &self.store
    }

    pub fn income(&self) -> &[Income] {
        &self.income
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn add_income(&mut self, draft: NewIncome) -> Result<Income> {
        let record = draft.into_record(new_record_id());
        let mut next = self.income.clone();
        next.push(record.clone());
        self.store.save_income(&next)?;
        self.income = next;
        tracing::info!(id = %record.id, amount = record.amount, "income added");
        Ok(record)
    }

    pub fn add_expense(&mut self, draft: NewExpense) -> Result<Expense> {
        let record = draft.into_record(new_record_id());
        let mut next = self.expenses.clone();
        next.push(record.clone());
        self.store.save_expenses(&next)?;
        self.expenses = next;
        tracing::info!(id = %record.id, category = %record.category, "expense added");
        Ok(record)
    }

    /// Replaces the stored record carrying the same id.
    pub fn update_income(&mut self, record: Income) -> Result<()> {
        let label = record.display_label();
        let mut next = self.income.clone();
        replace_by_id(&mut next, record, TransactionKind::Income)?;
        self.store.save_income(&next)?;
        self.income = next;
        tracing::info!(record = %label, "income updated");
        Ok(())
    }

    pub fn update_expense(&mut self, record: Expense) -> Result<()> {
        let label = record.display_label();
        let mut next = self.expenses.clone();
        replace_by_id(&mut next, record, TransactionKind::Expense)?;
        self.store.save_expenses(&next)?;
        self.expenses = next;
        tracing::info!(record = %label, "expense updated");
        Ok(())
    }

    pub fn remove_income(&mut self, id: &str) -> Result<()> {
        let mut next = self.income.clone();
        remove_by_id(&mut next, id, TransactionKind::Income)?;
        self.store.save_income(&next)?;
        self.income = next;
        tracing::info!(id, "income removed");
        Ok(())
    }

    pub fn remove_expense(&mut self, id: &str) -> Result<()> {
        let mut next = self.expenses.clone();
        remove_by_id(&mut next, id, TransactionKind::Expense)?;
        self.store.save_expenses(&next)?;
        self.expenses = next;
        tracing::info!(id, "expense removed");
        Ok(())
    }

    /// Returns `false` when the name already exists; nothing is written then.
    pub fn add_category(&mut self, name: &str) -> Result<bool> {
        validate_category_name(name)?;
        let mut next = self.categories.clone();
        if !next.insert(name.trim()) {
            return Ok(false);
        }
        self.store.save_categories(&next)?;
        self.categories = next;
        Ok(true)
    }

    pub fn update_settings(&mut self, settings: DisplaySettings) -> Result<()> {
        self.store.save_settings(&settings)?;
        self.settings = settings;
        Ok(())
    }

    pub fn format_amount(&self, amount: f64) -> String {
        self.settings.format_amount(amount)
    }

    pub fn find_transaction(&self, kind: TransactionKind, id: &str) -> Lookup<'_> {
        let found = match kind {
            TransactionKind::Income => self
                .income
                .iter()
                .find(|record| record.id == id)
                .map(Transaction::Income),
            TransactionKind::Expense => self
                .expenses
                .iter()
                .find(|record| record.id == id)
                .map(Transaction::Expense),
        };
        found.map_or(Lookup::NotFound, Lookup::Found)
    }

    pub fn summary_for<Tz: TimeZone>(&self, reference: &DateTime<Tz>) -> MonthlySummary {
        MonthlySummary::for_month(&self.income, &self.expenses, reference)
    }

    pub fn trend<Tz: TimeZone>(&self, reference: &DateTime<Tz>, months: usize) -> Vec<MonthlyTotals> {
        monthly_trend(&self.income, &self.expenses, reference, months)
    }

    /// Advice over every stored record.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        generate_suggestions(&self.expenses, &self.income)
    }

    pub fn recurring<Tz: TimeZone>(&self, today: &DateTime<Tz>) -> Vec<&Expense> {
        recurring_expenses(&self.expenses, today)
    }

    /// Highest-spending categories across all expenses.
    pub fn top_categories(&self, n: usize) -> Vec<CategoryTotal> {
        let totals = expenses_by_category(&self.expenses);
        top_categories(&totals, n).into_iter().cloned().collect()
    }
}

fn replace_by_id<T: Identifiable>(
    records: &mut [T],
    record: T,
    kind: TransactionKind,
) -> Result<()> {
    match records.iter_mut().find(|existing| existing.id() == record.id()) {
        Some(slot) => {
            *slot = record;
            Ok(())
        }
        None => Err(FinanceError::not_found(kind, record.id())),
    }
}

fn remove_by_id<T: Identifiable>(records: &mut Vec<T>, id: &str, kind: TransactionKind) -> Result<()> {
    let position = records
        .iter()
        .position(|record| record.id() == id)
        .ok_or_else(|| FinanceError::not_found(kind, id))?;
    records.remove(position);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StoreError, StoreResult};
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Memory store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("disk full".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            self.inner.remove(key)
        }
    }

    fn state() -> AppState<MemoryStore> {
        AppState::open(FinanceStore::new(MemoryStore::new()))
    }

    fn salary() -> NewIncome {
        NewIncome {
            amount: 2000.0,
            source: "Salary".into(),
            date: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            notes: None,
        }
    }

    fn groceries(amount: f64) -> NewExpense {
        NewExpense {
            amount,
            title: "Groceries".into(),
            category: "Food".into(),
            date: Utc.with_ymd_and_hms(2024, 6, 3, 18, 0, 0).unwrap(),
            tags: vec![],
            notes: None,
        }
    }

    #[test]
    fn open_seeds_categories() {
        let state = state();
        assert_eq!(state.categories(), &CategorySet::default());
        assert!(state.income().is_empty());
    }

    #[test]
    fn added_records_get_fresh_ids_and_persist() {
        let mut state = state();
        let first = state.add_income(salary()).expect("add");
        let second = state.add_income(salary()).expect("add");
        assert_ne!(first.id, second.id);
        assert_eq!(state.store().income().len(), 2);
    }

    #[test]
    fn update_replaces_matching_record() {
        let mut state = state();
        let mut expense = state.add_expense(groceries(40.0)).expect("add");
        expense.amount = 55.0;
        state.update_expense(expense.clone()).expect("update");
        assert_eq!(state.expenses()[0].amount, 55.0);
        assert_eq!(state.store().expenses()[0].amount, 55.0);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut state = state();
        let ghost = Expense::new(1.0, "Ghost", "Other", Utc::now());
        assert!(matches!(
            state.update_expense(ghost),
            Err(FinanceError::NotFound { kind: TransactionKind::Expense, .. })
        ));
        assert!(matches!(
            state.remove_income("nope"),
            Err(FinanceError::NotFound { kind: TransactionKind::Income, .. })
        ));
        assert_eq!(state.find_transaction(TransactionKind::Income, "nope"), Lookup::NotFound);
    }

    #[test]
    fn find_transaction_respects_kind() {
        let mut state = state();
        let income = state.add_income(salary()).expect("add");
        let found = state
            .find_transaction(TransactionKind::Income, &income.id)
            .found()
            .expect("income present");
        assert_eq!(found.label(), "Salary");
        assert_eq!(
            state.find_transaction(TransactionKind::Expense, &income.id),
            Lookup::NotFound
        );
    }

    #[test]
    fn add_category_validates_and_dedups() {
        let mut state = state();
        assert!(matches!(
            state.add_category("  "),
            Err(FinanceError::Validation(_))
        ));
        assert!(!state.add_category("Food").expect("existing"));
        assert!(state.add_category(" Pets ").expect("new"));
        assert!(state.categories().contains("Pets"));
        assert!(state.store().categories().contains("Pets"));
    }

    #[test]
    fn failed_write_leaves_state_untouched() {
        let mut state = AppState::open(FinanceStore::new(FlakyStore::default()));
        let kept = state.add_expense(groceries(20.0)).expect("add");
        state.store().backend().fail_writes.store(true, Ordering::SeqCst);

        let err = state.add_expense(groceries(30.0)).unwrap_err();
        assert!(matches!(err, FinanceError::Storage(_)));
        assert_eq!(state.expenses().len(), 1);

        let mut edited = kept.clone();
        edited.amount = 99.0;
        assert!(state.update_expense(edited).is_err());
        assert_eq!(state.expenses()[0].amount, 20.0);

        assert!(state.remove_expense(&kept.id).is_err());
        assert_eq!(state.expenses().len(), 1);
        assert!(state.add_category("Pets").is_err());
        assert!(!state.categories().contains("Pets"));
    }

    #[test]
    fn views_use_loaded_records() {
        let mut state = state();
        state.add_income(salary()).expect("add");
        state.add_expense(groceries(400.0)).expect("add");
        let summary = state.summary_for(&Utc.with_ymd_and_hms(2024, 6, 20, 0, 0, 0).unwrap());
        assert_eq!(summary.balance, 1600.0);
        assert_eq!(state.top_categories(3)[0].category, "Food");
        assert!(!state.suggestions().is_empty());
        assert_eq!(state.format_amount(1600.0), "$1,600.00");
    }
}
