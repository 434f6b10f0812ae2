use chrono::NaiveDate;
use serde::Serialize;

use tally_core::aggregate::analysis::{self, Recommendation};
use tally_core::aggregate::patterns::{self, SpendingPattern};
use tally_core::aggregate::{self as agg, CategoryTotal, MonthlyPoint};
use tally_core::budget::{budget_overview, BudgetOverview};
use tally_core::domain::{Budget, Tab, Transaction};
use tally_core::time::YearMonth;

const TOP_CATEGORIES: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub tab: Tab,
    pub month: YearMonth,
    pub total: f64,
    pub current_month_total: f64,
    pub previous_month_total: f64,
    pub percentage_change: i64,
    pub monthly: Vec<MonthlyPoint>,
    pub top_categories: Vec<CategoryTotal>,
    pub budgets: BudgetOverview,
    pub spending_patterns: Vec<SpendingPattern>,
    pub recommendations: Vec<Recommendation>,
}

pub fn build_report(transactions: &[Transaction], budgets: &Budget, tab: Tab, today: NaiveDate) -> Report {
    let kind = tab.kind();
    let month = YearMonth::of(today);
    let current = agg::current_month_total(transactions, kind, today);
    let previous = agg::previous_month_total(transactions, kind, today);

    let mut top_categories = agg::category_breakdown(transactions, kind);
    top_categories.truncate(TOP_CATEGORIES);

    let spent = agg::monthly_category_spend(transactions, month);
    let insights = analysis::analyze_transactions(transactions);

    Report {
        tab,
        month,
        total: agg::type_total(transactions, kind),
        current_month_total: current,
        previous_month_total: previous,
        percentage_change: agg::percentage_change(current, previous),
        monthly: agg::monthly_series(transactions, kind),
        top_categories,
        budgets: budget_overview(budgets, &spent),
        spending_patterns: patterns::spending_patterns(transactions, today),
        recommendations: analysis::recommendations(&insights, transactions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::domain::default_budgets;
    use tally_core::ledger::seed_transactions;

    #[test]
    fn expense_report_for_july() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 20).unwrap();
        let report = build_report(&seed_transactions(), &default_budgets(), Tab::Expenses, today);

        assert_eq!(report.month.to_string(), "2025-07");
        assert_eq!(report.top_categories.len(), 5);
        assert_eq!(report.top_categories[0].name, "Salaries");
        assert_eq!(report.monthly.len(), 7);
        assert_eq!(report.current_month_total, 10555.75);

        let rent = report.budgets.lines.iter().find(|l| l.category == "Rent").unwrap();
        assert_eq!(rent.utilization, 100.0);
    }

    #[test]
    fn empty_ledger_report_is_all_zero() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 20).unwrap();
        let report = build_report(&[], &Budget::new(), Tab::Income, today);
        assert_eq!(report.total, 0.0);
        assert_eq!(report.percentage_change, 0);
        assert!(report.monthly.is_empty());
        assert!(report.budgets.lines.is_empty());
    }
}
