//! Detection of expenses that repeat month over month.

use chrono::{DateTime, TimeZone};

use crate::core::aggregation::total_expenses;
use crate::core::date_range::{filter_by_month, previous_month};
use crate::domain::Expense;

/// Allowed deviation, as a fraction of last month's amount.
pub const RECURRENCE_TOLERANCE: f64 = 0.10;

/// Current-month expenses with a similar expense in the previous month.
///
/// Similar means the same category (exact match) and an amount strictly
/// within 10% of the previous month's amount. The tolerance is relative to
/// the previous expense, not the current one.
pub fn recurring_expenses<'a, Tz: TimeZone>(
    expenses: &'a [Expense],
    today: &DateTime<Tz>,
) -> Vec<&'a Expense> {
    let current = filter_by_month(expenses, today);
    let previous = filter_by_month(expenses, &previous_month(today));
    let recurring: Vec<&'a Expense> = current
        .into_iter()
        .filter(|candidate| previous.iter().any(|last| is_similar(last, candidate)))
        .collect();
    tracing::debug!(
        count = recurring.len(),
        prior = previous.len(),
        "detected recurring expenses"
    );
    recurring
}

/// Total spent this month on recurring expenses.
pub fn recurring_total<Tz: TimeZone>(expenses: &[Expense], today: &DateTime<Tz>) -> f64 {
    total_expenses(recurring_expenses(expenses, today))
}

fn is_similar(previous: &Expense, current: &Expense) -> bool {
    previous.category == current.category
        && (previous.amount - current.amount).abs() < previous.amount * RECURRENCE_TOLERANCE
}
