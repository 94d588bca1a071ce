pub mod aggregation;
pub mod app_state;
pub mod date_range;
pub mod recurrence;
pub mod reports;
pub mod suggestions;
pub mod validation;

pub use aggregation::{CategoryTotal, CategoryTotals, PieSlice};
pub use app_state::{AppState, Lookup};
pub use reports::{MonthCursor, MonthlySummary, MonthlyTotals};
pub use suggestions::Suggestion;
pub use validation::{ExpenseForm, FormField, IncomeForm, ValidationErrors};
