pub mod json_backend;
pub mod memory;
pub mod repository;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
pub use repository::FinanceStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid key `{0}`")]
    InvalidKey(String),
    #[error("Backup `{0}` not found")]
    BackupNotFound(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// String key-value persistence the record collections are stored in.
///
/// Values are opaque strings (JSON documents in practice). A missing key reads
/// as `None`, never as an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

/// Logical collections kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Income,
    Expenses,
    Categories,
    Settings,
}

impl StoreKey {
    pub fn logical_name(&self) -> &'static str {
        match self {
            StoreKey::Income => "income",
            StoreKey::Expenses => "expenses",
            StoreKey::Categories => "categories",
            StoreKey::Settings => "settings",
        }
    }

    /// Physical key: `<namespace>_<logical>`, or the bare logical name when the
    /// namespace is empty.
    pub fn physical(&self, namespace: &str) -> String {
        if namespace.is_empty() {
            self.logical_name().to_string()
        } else {
            format!("{}_{}", namespace, self.logical_name())
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.logical_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_keys_apply_namespace() {
        assert_eq!(StoreKey::Income.physical("moneyflow"), "moneyflow_income");
        assert_eq!(StoreKey::Categories.physical(""), "categories");
    }

    #[test]
    fn boxed_stores_forward_calls() {
        let store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
