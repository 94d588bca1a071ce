//! Expense category names.

use serde::{Deserialize, Serialize};

/// Categories seeded on first run.
pub const DEFAULT_CATEGORIES: [&str; 13] = [
    "Housing",
    "Food",
    "Transportation",
    "Entertainment",
    "Utilities",
    "Healthcare",
    "Shopping",
    "Personal",
    "Education",
    "Travel",
    "Savings",
    "Debt",
    "Other",
];

/// Ordered, duplicate-free list of category names.
///
/// Names compare by exact, case-sensitive match: `Food` and `food` are two
/// different categories. Entries are never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    pub fn empty() -> Self {
        Self { names: Vec::new() }
    }

    /// Returns `true` when the name was appended.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| existing == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        DEFAULT_CATEGORIES.iter().copied().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for CategorySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = CategorySet::empty();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl From<Vec<String>> for CategorySet {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<CategorySet> for Vec<String> {
    fn from(set: CategorySet) -> Self {
        set.names
    }
}
