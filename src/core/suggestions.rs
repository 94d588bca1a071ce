//! Rule-based savings advice.
//!
//! Rules run in a fixed order and each appends at most one suggestion. Every
//! rule is evaluated regardless of what earlier rules produced; the order of
//! the output is the display order.

use std::fmt;

use serde::Serialize;

use crate::core::aggregation::{expenses_by_category, total_expenses, total_income};
use crate::domain::{Expense, Income};

pub const FOOD_CATEGORY: &str = "Food";
pub const ENTERTAINMENT_CATEGORY: &str = "Entertainment";
pub const SAVINGS_CATEGORY: &str = "Savings";

/// Share of total expenses above which the largest category is flagged.
pub const DOMINANT_CATEGORY_PERCENT: f64 = 30.0;
pub const FOOD_INCOME_SHARE: f64 = 0.15;
pub const ENTERTAINMENT_INCOME_SHARE: f64 = 0.10;
pub const SAVINGS_INCOME_SHARE: f64 = 0.1;
/// Below this many rule hits the generic tips are appended.
pub const MIN_SPECIFIC_SUGGESTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Suggestion {
    Overspending,
    DominantCategory { category: String, percentage: f64 },
    HighFood,
    HighEntertainment,
    LowSavings,
    TrackLonger,
    FiftyThirtyTwenty,
}

impl Suggestion {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::Overspending => f.write_str(
                "Your expenses exceed your income. Consider reviewing your budget to find areas to cut back.",
            ),
            Suggestion::DominantCategory {
                category,
                percentage,
            } => write!(
                f,
                "Your {} expenses make up {}% of your total expenses. Look for ways to reduce this category.",
                category,
                one_decimal(*percentage)
            ),
            Suggestion::HighFood => f.write_str(
                "Your food expenses are relatively high. Consider meal planning or cooking at home more often.",
            ),
            Suggestion::HighEntertainment => f.write_str(
                "Your entertainment expenses exceed 10% of your income. Look for free or lower-cost entertainment options.",
            ),
            Suggestion::LowSavings => f.write_str(
                "Consider setting aside at least 10% of your income for savings or emergency fund.",
            ),
            Suggestion::TrackLonger => f.write_str(
                "Track your expenses for at least 2-3 months to get more personalized savings suggestions.",
            ),
            Suggestion::FiftyThirtyTwenty => f.write_str(
                "Consider using the 50/30/20 rule: 50% for needs, 30% for wants, and 20% for savings and debt repayment.",
            ),
        }
    }
}

/// Evaluates the rule table against the given records.
///
/// Threshold comparisons are literal: with zero income any positive Food or
/// Entertainment spend trips its rule, while the savings rule never fires.
pub fn generate_suggestions(expenses: &[Expense], income: &[Income]) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    let income_total = total_income(income);
    let expense_total = total_expenses(expenses);
    let by_category = expenses_by_category(expenses);

    if expense_total > income_total {
        suggestions.push(Suggestion::Overspending);
    }

    if let Some(top) = by_category.sorted_descending().first() {
        let percentage = (top.amount / expense_total) * 100.0;
        if percentage > DOMINANT_CATEGORY_PERCENT {
            suggestions.push(Suggestion::DominantCategory {
                category: top.category.clone(),
                percentage,
            });
        }
    }

    if by_category.amount_for(FOOD_CATEGORY) > income_total * FOOD_INCOME_SHARE {
        suggestions.push(Suggestion::HighFood);
    }

    if by_category.amount_for(ENTERTAINMENT_CATEGORY) > income_total * ENTERTAINMENT_INCOME_SHARE
    {
        suggestions.push(Suggestion::HighEntertainment);
    }

    if by_category.amount_for(SAVINGS_CATEGORY) < income_total * SAVINGS_INCOME_SHARE {
        suggestions.push(Suggestion::LowSavings);
    }

    if suggestions.len() < MIN_SPECIFIC_SUGGESTIONS {
        suggestions.push(Suggestion::TrackLonger);
        suggestions.push(Suggestion::FiftyThirtyTwenty);
    }

    tracing::debug!(count = suggestions.len(), "generated savings suggestions");
    suggestions
}

/// Rendered suggestion texts in display order.
pub fn suggestion_messages(expenses: &[Expense], income: &[Income]) -> Vec<String> {
    generate_suggestions(expenses, income)
        .iter()
        .map(Suggestion::message)
        .collect()
}

/// One decimal place; exact halves round away from zero.
///
/// `{:.1}` already rounds the exact binary value, which differs from half-up
/// rounding only when the value sits exactly on a hundredths tie.
fn one_decimal(value: f64) -> String {
    if is_exact_tie(value) {
        let rounded = ((value.abs() * 10.0).floor() + 1.0) / 10.0;
        return format!("{:.1}", rounded.copysign(value));
    }
    format!("{:.1}", value)
}

/// `true` when the exact decimal expansion of `value` is `x.d5000…`.
fn is_exact_tie(value: f64) -> bool {
    if !value.is_finite() {
        return false;
    }
    let expansion = format!("{:.60}", value.abs());
    match expansion.split_once('.') {
        Some((_, frac)) => {
            let mut tail = frac.bytes().skip(1);
            tail.next() == Some(b'5') && tail.all(|digit| digit == b'0')
        }
        None => false,
    }
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
    fn food_heavy_month_produces_category_and_food_tips() {
        // Food is 100% of expenses (rule 2) and 40% of income (rule 3); savings
        // are 0 < 100 (rule 5).
        let suggestions = generate_suggestions(&[expense("Food", 400.0)], &[income(1000.0)]);
        assert_eq!(
            suggestions,
            vec![
                Suggestion::DominantCategory {
                    category: "Food".into(),
                    percentage: 100.0
                },
                Suggestion::HighFood,
                Suggestion::LowSavings,
            ]
        );
    }

    #[test]
    fn single_hit_appends_generic_tips() {
        let expenses = vec![
            expense("Food", 200.0),
            expense("Housing", 200.0),
            expense("Travel", 200.0),
            expense("Savings", 200.0),
        ];
        let suggestions = generate_suggestions(&expenses, &[income(1000.0)]);
        assert_eq!(
            suggestions,
            vec![
                Suggestion::HighFood,
                Suggestion::TrackLonger,
                Suggestion::FiftyThirtyTwenty,
            ]
        );
    }

    #[test]
    fn empty_data_yields_generic_tips_only() {
        let messages = suggestion_messages(&[], &[]);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("Track your expenses"));
        assert!(messages[1].contains("50/30/20"));
    }

    #[test]
    fn overspending_is_reported_first() {
        let expenses = vec![expense("Entertainment", 50.0), expense("Other", 60.0)];
        let suggestions = generate_suggestions(&expenses, &[income(100.0)]);
        assert_eq!(suggestions[0], Suggestion::Overspending);
        assert!(suggestions.contains(&Suggestion::HighEntertainment));
        assert!(matches!(
            suggestions[1],
            Suggestion::DominantCategory { ref category, .. } if category == "Other"
        ));
    }

    #[test]
    fn zero_income_uses_literal_comparisons() {
        let expenses = vec![expense("Food", 1.0), expense("Entertainment", 1.0)];
        let suggestions = generate_suggestions(&expenses, &[]);
        assert!(suggestions.contains(&Suggestion::HighFood));
        assert!(suggestions.contains(&Suggestion::HighEntertainment));
        assert!(!suggestions.contains(&Suggestion::LowSavings));
    }

    #[test]
    fn category_percentage_renders_one_decimal() {
        let expenses = vec![expense("Housing", 2.0), expense("Food", 1.0)];
        let suggestions = generate_suggestions(&expenses, &[income(10_000.0)]);
        assert_eq!(
            suggestions[0].message(),
            "Your Housing expenses make up 66.7% of your total expenses. Look for ways to reduce this category."
        );
        assert_eq!(one_decimal(42.0), "42.0");
    }

    #[test]
    fn near_ties_round_by_their_exact_value() {
        // 603 / 2000 * 100 is stored just below 30.15.
        let expenses = vec![
            expense("Housing", 603.0),
            expense("Food", 600.0),
            expense("Travel", 500.0),
            expense("Other", 297.0),
        ];
        let suggestions = generate_suggestions(&expenses, &[income(100_000.0)]);
        assert!(suggestions[0]
            .message()
            .starts_with("Your Housing expenses make up 30.1% of your total expenses."));
        assert_eq!(one_decimal(30.15), "30.1");
        assert_eq!(one_decimal(0.05), "0.1");
    }

    #[test]
    fn exact_ties_round_up() {
        assert!(is_exact_tie(30.25));
        assert!(!is_exact_tie(30.15));
        assert_eq!(one_decimal(30.25), "30.3");
        assert_eq!(one_decimal(12.75), "12.8");
        assert_eq!(one_decimal(0.25), "0.3");
        assert_eq!(one_decimal(-0.25), "-0.3");
    }
}
