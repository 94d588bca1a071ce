//! Pure totals, category breakdowns and chart series over record slices.

use std::fmt::Write as _;

use serde::Serialize;

use crate::domain::{Amounted, Expense, Income};

/// Summed amount for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

/// Per-category sums in order of each category's first appearance.
///
/// Names that are canonical array indices (`"0"`, `"2024"`, but not `"007"`)
/// come first in ascending numeric order, the way stored category maps have
/// always enumerated them. Only categories with at least one expense are
/// present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryTotals {
    entries: Vec<CategoryTotal>,
}

impl CategoryTotals {
    pub fn get(&self, category: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.amount)
    }

    /// Sum for `category`, or zero when it has no expenses.
    pub fn amount_for(&self, category: &str) -> f64 {
        self.get(category).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryTotal> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|entry| entry.amount).sum()
    }

    /// Largest first; ties keep first-appearance order.
    pub fn sorted_descending(&self) -> Vec<&CategoryTotal> {
        let mut sorted: Vec<&CategoryTotal> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        sorted
    }

    fn add(&mut self, category: &str, amount: f64) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.category == category)
        {
            Some(entry) => entry.amount += amount,
            None => {
                let entry = CategoryTotal {
                    category: category.to_string(),
                    amount,
                };
                match array_index(category) {
                    Some(index) => {
                        let position = self
                            .entries
                            .iter()
                            .position(|existing| {
                                array_index(&existing.category).map_or(true, |other| other > index)
                            })
                            .unwrap_or(self.entries.len());
                        self.entries.insert(position, entry);
                    }
                    None => self.entries.push(entry),
                }
            }
        }
    }
}

/// Numeric value of a canonical array-index key: no sign, no leading zeros,
/// below `u32::MAX`.
fn array_index(name: &str) -> Option<u32> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if name.len() > 1 && name.starts_with('0') {
        return None;
    }
    name.parse::<u32>().ok().filter(|index| *index != u32::MAX)
}

impl<'a> IntoIterator for &'a CategoryTotals {
    type Item = &'a CategoryTotal;
    type IntoIter = std::slice::Iter<'a, CategoryTotal>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One pie-chart wedge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub category: String,
    pub amount: f64,
    pub color: String,
}

pub fn total_income<'a, I>(income: I) -> f64
where
    I: IntoIterator<Item = &'a Income>,
{
    sum_amounts(income)
}

pub fn total_expenses<'a, I>(expenses: I) -> f64
where
    I: IntoIterator<Item = &'a Expense>,
{
    sum_amounts(expenses)
}

/// Income minus expenses; negative when overspent.
pub fn balance<'a, I, E>(income: I, expenses: E) -> f64
where
    I: IntoIterator<Item = &'a Income>,
    E: IntoIterator<Item = &'a Expense>,
{
    total_income(income) - total_expenses(expenses)
}

pub fn expenses_by_category<'a, I>(expenses: I) -> CategoryTotals
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut totals = CategoryTotals::default();
    for expense in expenses {
        totals.add(&expense.category, expense.amount);
    }
    totals
}

/// Relative change against the previous value, in percent.
///
/// A zero previous value yields 100 when the current value is positive and 0
/// otherwise.
pub fn monthly_change_percentage(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    ((current - previous) / previous) * 100.0
}

pub fn pie_chart_series<'a, I>(expenses: I) -> Vec<PieSlice>
where
    I: IntoIterator<Item = &'a Expense>,
{
    expenses_by_category(expenses)
        .iter()
        .map(|entry| PieSlice {
            category: entry.category.clone(),
            amount: entry.amount,
            color: color_token(&entry.category),
        })
        .collect()
}

/// The `n` largest categories, largest first.
pub fn top_categories(totals: &CategoryTotals, n: usize) -> Vec<&CategoryTotal> {
    let mut sorted = totals.sorted_descending();
    sorted.truncate(n);
    sorted
}

/// Stable `#xxxxxx` color derived from a category name.
///
/// Hashes UTF-16 code units with 32-bit wrapping `c + (h << 5) - h` and emits
/// the low three bytes, least significant first. The byte order is not RGB;
/// existing charts depend on it.
pub fn color_token(name: &str) -> String {
    let hash = name.encode_utf16().fold(0i32, |hash, unit| {
        i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    });
    let mut color = String::with_capacity(7);
    color.push('#');
    for i in 0..3 {
        let value = (hash >> (i * 8)) & 0xFF;
        let _ = write!(color, "{:02x}", value);
    }
    color
}

fn sum_amounts<I>(records: I) -> f64
where
    I: IntoIterator,
    I::Item: Amounted,
{
    records.into_iter().map(|record| record.amount()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn expense(category: &str, amount: f64) -> Expense {
        Expense::new(
            amount,
            category,
            category,
            Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
        )
    }

    fn income(amount: f64) -> Income {
        Income::new(amount, "Salary", Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn totals_of_empty_lists_are_zero() {
        assert_eq!(total_income(&Vec::<Income>::new()), 0.0);
        assert_eq!(total_expenses(&Vec::<Expense>::new()), 0.0);
    }

    #[test]
    fn balance_may_go_negative() {
        let income = vec![income(100.0), income(50.0)];
        let expenses = vec![expense("Food", 120.0), expense("Housing", 80.0)];
        assert_eq!(total_income(&income), 150.0);
        assert_eq!(total_expenses(&expenses), 200.0);
        assert_eq!(balance(&income, &expenses), -50.0);
    }

    #[test]
    fn categories_sum_in_first_seen_order() {
        let expenses = vec![
            expense("Travel", 10.0),
            expense("Food", 5.0),
            expense("Travel", 2.5),
        ];
        let totals = expenses_by_category(&expenses);
        let order: Vec<_> = totals.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(order, ["Travel", "Food"]);
        assert_eq!(totals.get("Travel"), Some(12.5));
        assert_eq!(totals.get("Housing"), None);
        assert_eq!(totals.amount_for("Housing"), 0.0);
        assert!(totals.iter().all(|entry| entry.amount > 0.0));
    }

    #[test]
    fn change_percentage_conventions() {
        assert_eq!(monthly_change_percentage(0.0, 0.0), 0.0);
        assert_eq!(monthly_change_percentage(50.0, 0.0), 100.0);
        assert_eq!(monthly_change_percentage(150.0, 100.0), 50.0);
        assert_eq!(monthly_change_percentage(50.0, 100.0), -50.0);
    }

    #[test]
    fn color_tokens_are_stable() {
        assert_eq!(color_token("Food"), "#7e8021");
        assert_eq!(color_token("Food"), color_token("Food"));
        assert_eq!(color_token(""), "#000000");
        assert_ne!(color_token("Food"), color_token("food"));
        let long = "Entertainment and Subscriptions ".repeat(8);
        let token = color_token(&long);
        assert_eq!(token.len(), 7);
        assert!(token[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn pie_series_follows_category_order() {
        let expenses = vec![expense("Food", 40.0), expense("Housing", 60.0)];
        let series = pie_chart_series(&expenses);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].category, "Food");
        assert_eq!(series[0].color, "#7e8021");
        assert_eq!(series[1].amount, 60.0);
    }

    #[test]
    fn top_categories_break_ties_by_first_appearance() {
        let expenses = vec![
            expense("Food", 30.0),
            expense("Travel", 50.0),
            expense("Housing", 30.0),
            expense("Debt", 10.0),
        ];
        let totals = expenses_by_category(&expenses);
        let top: Vec<_> = top_categories(&totals, 3)
            .into_iter()
            .map(|e| e.category.as_str())
            .collect();
        assert_eq!(top, ["Travel", "Food", "Housing"]);
    }

    #[test]
    fn numeric_category_names_sort_first() {
        let expenses = vec![
            expense("Food", 10.0),
            expense("2024", 10.0),
            expense("007", 10.0),
            expense("12", 10.0),
            expense("Travel", 10.0),
            expense("4294967295", 10.0),
        ];
        let totals = expenses_by_category(&expenses);
        let order: Vec<_> = totals.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(order, ["12", "2024", "Food", "007", "Travel", "4294967295"]);

        let top: Vec<_> = top_categories(&totals, 1)
            .into_iter()
            .map(|e| e.category.as_str())
            .collect();
        assert_eq!(top, ["12"]);
    }

    #[test]
    fn array_index_rules() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("4294967294"), Some(4_294_967_294));
        assert_eq!(array_index("4294967295"), None);
        assert_eq!(array_index("01"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index(""), None);
    }
}
