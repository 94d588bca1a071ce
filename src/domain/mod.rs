pub mod category;
pub mod common;
pub mod expense;
pub mod income;
pub mod transaction;

pub use category::{CategorySet, DEFAULT_CATEGORIES};
pub use common::{Amounted, Dated, Displayable, Identifiable};
pub use expense::{Expense, NewExpense};
pub use income::{Income, NewIncome};
pub use transaction::{Transaction, TransactionKind};
