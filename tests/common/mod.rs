#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use moneyflow_core::{
    config::ConfigManager,
    domain::{NewExpense, NewIncome},
    storage::{FinanceStore, JsonFileStore},
    AppState,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates an isolated on-disk state and config manager for each test.
pub fn setup_test_env() -> (AppState<JsonFileStore>, ConfigManager, PathBuf) {
    let base = temp_base();
    let backend = JsonFileStore::new(&base, Some(3)).expect("create json store");
    let state = AppState::open(FinanceStore::new(backend));
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (state, config_manager, base)
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn income(amount: f64, source: &str, date: DateTime<Utc>) -> NewIncome {
    NewIncome {
        amount,
        source: source.into(),
        date,
        notes: None,
    }
}

pub fn expense(amount: f64, title: &str, category: &str, date: DateTime<Utc>) -> NewExpense {
    NewExpense {
        amount,
        title: title.into(),
        category: category.into(),
        date,
        tags: Vec::new(),
        notes: None,
    }
}
