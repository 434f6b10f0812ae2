use crate::aggregate::budget_utilization;
use crate::domain::Budget;
use crate::insight::response::BudgetSuggestion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Utilization above which a category is flagged for a larger budget.
pub const INCREASE_ABOVE: f64 = 95.0;
/// Utilization below which a category is flagged for a smaller budget.
pub const DECREASE_BELOW: f64 = 60.0;

const INCREASE_HEADROOM: f64 = 1.10;
const DECREASE_HEADROOM: f64 = 1.05;

const ESSENTIAL: [&str; 2] = ["Rent", "Salaries"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionAction {
    Increase,
    Decrease,
}

/// `> 95` increase, `< 60` decrease, anything in between is left alone.
pub fn classify(utilization: f64) -> Option<SuggestionAction> {
    if utilization > INCREASE_ABOVE {
        Some(SuggestionAction::Increase)
    } else if utilization < DECREASE_BELOW {
        Some(SuggestionAction::Decrease)
    } else {
        None
    }
}

pub fn is_essential(category: &str) -> bool {
    ESSENTIAL.contains(&category)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUtilization {
    pub category: String,
    pub average_spending: f64,
    pub current_budget: f64,
    pub utilization: f64,
    pub action: Option<SuggestionAction>,
    pub essential: bool,
}

/// One row per category with historical spending. A category without a
/// positive budget is always flagged for increase.
pub fn category_utilization(averages: &BTreeMap<String, f64>, budgets: &Budget) -> Vec<CategoryUtilization> {
    averages
        .iter()
        .map(|(category, &avg)| {
            let budget = budgets.get(category).copied().unwrap_or(0.0);
            let utilization = budget_utilization(budget, avg);
            let action = if budget <= 0.0 {
                (avg > 0.0).then_some(SuggestionAction::Increase)
            } else {
                classify(utilization)
            };
            CategoryUtilization {
                category: category.clone(),
                average_spending: avg,
                current_budget: budget,
                utilization,
                action,
                essential: is_essential(category),
            }
        })
        .collect()
}

/// Rule-based suggestions used when the remote model is unavailable. Applies
/// a flat headroom over average spend and ignores essential-category
/// conservatism.
pub fn local_suggestions(rows: &[CategoryUtilization]) -> Vec<BudgetSuggestion> {
    rows.iter()
        .filter_map(|row| {
            let action = row.action?;
            let (factor, reasoning) = match action {
                SuggestionAction::Increase if row.current_budget <= 0.0 => (
                    INCREASE_HEADROOM,
                    format!(
                        "No budget is set; average monthly spending is ${:.0}. Suggested budget adds 10% headroom.",
                        row.average_spending
                    ),
                ),
                SuggestionAction::Increase => (
                    INCREASE_HEADROOM,
                    format!(
                        "Average monthly spending of ${:.0} uses {:.0}% of the ${:.0} budget. Raising it to cover typical spend plus 10%.",
                        row.average_spending, row.utilization, row.current_budget
                    ),
                ),
                SuggestionAction::Decrease => (
                    DECREASE_HEADROOM,
                    format!(
                        "Average monthly spending of ${:.0} uses only {:.0}% of the ${:.0} budget. Lowering it to typical spend plus 5% frees funds.",
                        row.average_spending, row.utilization, row.current_budget
                    ),
                ),
            };
            Some(BudgetSuggestion {
                category: row.category.clone(),
                current_budget: row.current_budget,
                suggested_budget: (row.average_spending * factor).round(),
                reasoning,
                avg_spending: row.average_spending,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn classification_thresholds_are_exclusive() {
        assert_eq!(classify(95.0), None);
        assert_eq!(classify(95.01), Some(SuggestionAction::Increase));
        assert_eq!(classify(60.0), None);
        assert_eq!(classify(59.99), Some(SuggestionAction::Decrease));
        assert_eq!(classify(80.0), None);
    }

    #[test]
    fn marketing_over_budget_is_flagged_for_increase() {
        let rows = category_utilization(&map(&[("Marketing", 600.0)]), &map(&[("Marketing", 500.0)]));
        assert_eq!(rows[0].utilization, 120.0);
        assert_eq!(rows[0].action, Some(SuggestionAction::Increase));

        let suggestions = local_suggestions(&rows);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].suggested_budget, 660.0);
        assert_eq!(suggestions[0].current_budget, 500.0);
    }

    #[test]
    fn underused_budget_shrinks_and_middle_band_is_skipped() {
        let averages = map(&[("Travel", 500.0), ("Utilities", 300.0)]);
        let budgets = map(&[("Travel", 1000.0), ("Utilities", 350.0)]);
        let rows = category_utilization(&averages, &budgets);
        let suggestions = local_suggestions(&rows);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].category, "Travel");
        assert_eq!(suggestions[0].suggested_budget, 525.0);
    }

    #[test]
    fn missing_budget_is_an_increase() {
        let rows = category_utilization(&map(&[("Software", 100.0)]), &Budget::new());
        assert_eq!(rows[0].action, Some(SuggestionAction::Increase));
        assert_eq!(local_suggestions(&rows)[0].suggested_budget, 110.0);
    }

    #[test]
    fn essential_categories_are_marked() {
        let rows = category_utilization(&map(&[("Rent", 3000.0), ("Travel", 1.0)]), &map(&[("Rent", 3000.0)]));
        assert!(rows.iter().find(|r| r.category == "Rent").unwrap().essential);
        assert!(!rows.iter().find(|r| r.category == "Travel").unwrap().essential);
    }
}
