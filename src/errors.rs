use std::fmt;

use thiserror::Error;

use crate::core::validation::ValidationErrors;
use crate::domain::TransactionKind;

/// Unified error type for the domain, storage and state layers.
#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("{kind} record not found: {id}")]
    NotFound { kind: TransactionKind, id: String },
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FinanceError>;

impl FinanceError {
    pub fn not_found(kind: TransactionKind, id: impl Into<String>) -> Self {
        FinanceError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Short message suitable for surfacing a failed user action.
    pub fn user_message(&self, action: UserAction) -> String {
        match self {
            FinanceError::Validation(errors) => errors.to_string(),
            FinanceError::NotFound { .. } => "Transaction not found".into(),
            FinanceError::Storage(_) | FinanceError::Config(_) => {
                format!("Failed to {action}. Please try again.")
            }
        }
    }
}

/// The mutation a user attempted, used to phrase failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Save,
    Update,
    Delete,
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UserAction::Save => "save",
            UserAction::Update => "update",
            UserAction::Delete => "delete",
        };
        f.write_str(label)
    }
}

impl From<ValidationErrors> for FinanceError {
    fn from(err: ValidationErrors) -> Self {
        FinanceError::Validation(err)
    }
}

impl From<std::io::Error> for FinanceError {
    fn from(err: std::io::Error) -> Self {
        FinanceError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for FinanceError {
    fn from(err: serde_json::Error) -> Self {
        FinanceError::Storage(err.to_string())
    }
}

impl From<crate::storage::StoreError> for FinanceError {
    fn from(err: crate::storage::StoreError) -> Self {
        FinanceError::Storage(err.to_string())
    }
}
