//! Month-level views composed from the aggregation primitives.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::Serialize;

use crate::core::aggregation::{
    expenses_by_category, monthly_change_percentage, pie_chart_series, total_expenses,
    total_income, CategoryTotals, PieSlice,
};
use crate::core::date_range::{filter_by_month, month_range, same_month, shift_month};
use crate::currency::{month_name, short_month_label};
use crate::domain::{Dated, Expense, Income, Transaction};

/// Totals, breakdown and change figures for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: NaiveDate,
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub by_category: CategoryTotals,
    pub pie: Vec<PieSlice>,
    pub income_change: f64,
    pub expense_change: f64,
}

impl MonthlySummary {
    pub fn for_month<Tz: TimeZone>(
        income: &[Income],
        expenses: &[Expense],
        reference: &DateTime<Tz>,
    ) -> Self {
        let month_income = filter_by_month(income, reference);
        let month_expenses = filter_by_month(expenses, reference);
        let previous = shift_month(reference, -1);
        let prior_income = total_income(filter_by_month(income, &previous));
        let prior_expenses = total_expenses(filter_by_month(expenses, &previous));

        let income_total = total_income(month_income.iter().copied());
        let expense_total = total_expenses(month_expenses.iter().copied());
        Self {
            month: month_range(reference).first_day(),
            total_income: income_total,
            total_expenses: expense_total,
            balance: income_total - expense_total,
            by_category: expenses_by_category(month_expenses.iter().copied()),
            pie: pie_chart_series(month_expenses.iter().copied()),
            income_change: monthly_change_percentage(income_total, prior_income),
            expense_change: monthly_change_percentage(expense_total, prior_expenses),
        }
    }

    pub fn label(&self) -> String {
        month_name(self.month)
    }
}

/// One point of the income/expense trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub month: NaiveDate,
    pub label: &'static str,
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
}

/// Totals for the `months` calendar months ending with the reference month,
/// oldest first.
pub fn monthly_trend<Tz: TimeZone>(
    income: &[Income],
    expenses: &[Expense],
    reference: &DateTime<Tz>,
    months: usize,
) -> Vec<MonthlyTotals> {
    (0..months)
        .rev()
        .map(|back| {
            let offset = i32::try_from(back).map_or(i32::MIN, |back| -back);
            let month = shift_month(reference, offset);
            let income_total = total_income(filter_by_month(income, &month));
            let expense_total = total_expenses(filter_by_month(expenses, &month));
            let first_day = month.naive_local().date();
            MonthlyTotals {
                month: first_day,
                label: short_month_label(first_day.month()),
                income: income_total,
                expenses: expense_total,
                balance: income_total - expense_total,
            }
        })
        .collect()
}

/// The month's income and expenses merged, newest first.
pub fn monthly_transactions<'a, Tz: TimeZone>(
    income: &'a [Income],
    expenses: &'a [Expense],
    reference: &DateTime<Tz>,
) -> Vec<Transaction<'a>> {
    let mut merged: Vec<Transaction<'a>> = filter_by_month(income, reference)
        .into_iter()
        .map(Transaction::Income)
        .chain(
            filter_by_month(expenses, reference)
                .into_iter()
                .map(Transaction::Expense),
        )
        .collect();
    merged.sort_by(|a, b| b.date().cmp(&a.date()));
    merged
}

/// Selected month for month-by-month browsing; never moves past the present.
#[derive(Debug, Clone)]
pub struct MonthCursor<Tz: TimeZone> {
    month_start: DateTime<Tz>,
}

impl<Tz: TimeZone> MonthCursor<Tz> {
    pub fn new(reference: &DateTime<Tz>) -> Self {
        Self {
            month_start: shift_month(reference, 0),
        }
    }

    /// First instant of the selected month; use it as the filter reference.
    pub fn reference(&self) -> &DateTime<Tz> {
        &self.month_start
    }

    pub fn previous(&mut self) {
        self.month_start = shift_month(&self.month_start, -1);
    }

    /// Moves forward one month unless that month starts after `now`.
    pub fn next(&mut self, now: &DateTime<Tz>) -> bool {
        let candidate = shift_month(&self.month_start, 1);
        if candidate > *now {
            return false;
        }
        self.month_start = candidate;
        true
    }

    pub fn is_current_month(&self, now: &DateTime<Tz>) -> bool {
        same_month(&self.month_start, now)
    }

    pub fn label(&self) -> String {
        month_name(self.month_start.naive_local().date())
    }
}
