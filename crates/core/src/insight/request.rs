use crate::aggregate::{
    self, category_breakdown, category_monthly_averages, monthly_category_spend, percentage_change,
    trailing_months, type_total, vendor_breakdown, CategoryTotal, MonthlyPoint, VendorTotal,
};
use crate::domain::{Budget, Tab, Transaction, TransactionType};
use crate::insight::suggest::{category_utilization, CategoryUtilization};
use crate::insight::Intent;
use crate::time::YearMonth;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;

const DASHBOARD_RECENT: usize = 20;
const TREND_MONTHS: usize = 6;
const TOP_VENDORS: usize = 3;
/// Overall change (percent) beyond which a chart counts as growing/declining.
const TREND_DIRECTION_BAND: f64 = 5.0;

/// A payload type bound to one intent, knowing how to read the remote answer
/// and how to stand in for it.
pub trait InsightRequest: Serialize + Send + Sync {
    const INTENT: Intent;
    type Output: Serialize + Clone + Debug + Send;

    /// Parses and validates a raw response body.
    fn normalize(&self, body: &str) -> anyhow::Result<Self::Output>;

    /// Schema-complete substitute built from this payload's own metrics.
    fn fallback(&self) -> Self::Output;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub profit_margin: f64,
    pub transaction_count: usize,
    pub transactions: Vec<Transaction>,
}

impl DashboardPayload {
    pub fn build(transactions: &[Transaction]) -> Self {
        let total_income = type_total(transactions, TransactionType::Income);
        let total_expenses = type_total(transactions, TransactionType::Expense);
        let net_profit = total_income - total_expenses;
        let profit_margin = if total_income > 0.0 {
            net_profit * 100.0 / total_income
        } else {
            0.0
        };
        let recent_from = transactions.len().saturating_sub(DASHBOARD_RECENT);

        Self {
            total_income,
            total_expenses,
            net_profit,
            profit_margin,
            transaction_count: transactions.len(),
            transactions: transactions[recent_from..].to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsPayload {
    pub selected_tab: Tab,
    pub total_amount: f64,
    pub transaction_count: usize,
    pub category_breakdown: Vec<CategoryTotal>,
    pub monthly_trend: Vec<MonthlyPoint>,
}

impl AnalyticsPayload {
    pub fn build(transactions: &[Transaction], tab: Tab, today: NaiveDate) -> Self {
        let kind = tab.kind();
        Self {
            selected_tab: tab,
            total_amount: type_total(transactions, kind),
            transaction_count: transactions.iter().filter(|t| t.is(kind)).count(),
            category_breakdown: category_breakdown(transactions, kind),
            monthly_trend: trailing_months(transactions, kind, today, TREND_MONTHS),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetailPayload {
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub total_amount: f64,
    pub transaction_count: usize,
    pub average_amount: f64,
    pub top_vendors: Vec<VendorTotal>,
}

impl CategoryDetailPayload {
    /// An unknown or empty category yields zero totals, not an error.
    pub fn build(transactions: &[Transaction], category: &str, kind: TransactionType) -> Self {
        let matching: Vec<Transaction> = transactions
            .iter()
            .filter(|t| t.is(kind) && t.category == category)
            .cloned()
            .collect();
        let total_amount: f64 = matching.iter().map(Transaction::magnitude).sum();
        let average_amount = if matching.is_empty() {
            0.0
        } else {
            total_amount / matching.len() as f64
        };
        let mut top_vendors = vendor_breakdown(&matching);
        top_vendors.truncate(TOP_VENDORS);

        Self {
            category: category.to_string(),
            kind,
            total_amount,
            transaction_count: matching.len(),
            average_amount,
            top_vendors,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Growing,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartTrendPayload {
    #[serde(rename = "type")]
    pub tab: Tab,
    pub monthly_data: Vec<MonthlyPoint>,
    pub total_amount: f64,
    pub average_amount: f64,
    pub overall_change: f64,
    pub peak: MonthlyPoint,
    pub trough: MonthlyPoint,
    pub trend_direction: TrendDirection,
}

impl ChartTrendPayload {
    /// `None` for an empty series: there is no chart to narrate.
    pub fn build(series: Vec<MonthlyPoint>, tab: Tab) -> Option<Self> {
        let first = series.first()?.amount;
        let last = series.last()?.amount;
        let total_amount: f64 = series.iter().map(|p| p.amount).sum();
        let average_amount = total_amount / series.len() as f64;
        let overall_change = if first == 0.0 {
            0.0
        } else {
            ((last - first) * 1000.0 / first).round() / 10.0
        };

        // First occurrence wins on ties, matching the rendered bar order.
        let mut peak = &series[0];
        let mut trough = &series[0];
        for p in &series[1..] {
            if p.amount > peak.amount {
                peak = p;
            }
            if p.amount < trough.amount {
                trough = p;
            }
        }

        let trend_direction = if overall_change > TREND_DIRECTION_BAND {
            TrendDirection::Growing
        } else if overall_change < -TREND_DIRECTION_BAND {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        };

        Some(Self {
            tab,
            peak: peak.clone(),
            trough: trough.clone(),
            monthly_data: series,
            total_amount,
            average_amount,
            overall_change,
            trend_direction,
        })
    }

    pub fn from_ledger(transactions: &[Transaction], tab: Tab) -> Option<Self> {
        Self::build(aggregate::monthly_series(transactions, tab.kind()), tab)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickInsightPayload {
    #[serde(rename = "type")]
    pub tab: Tab,
    pub current_total: f64,
    pub percentage_change: i64,
}

impl QuickInsightPayload {
    pub fn build(transactions: &[Transaction], tab: Tab, today: NaiveDate) -> Self {
        let current = aggregate::current_month_total(transactions, tab.kind(), today);
        let previous = aggregate::previous_month_total(transactions, tab.kind(), today);
        Self {
            tab,
            current_total: current,
            percentage_change: percentage_change(current, previous),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSuggestionPayload {
    pub transactions: Vec<Transaction>,
    pub current_budgets: Budget,
    pub category_averages: BTreeMap<String, f64>,
    pub utilization: Vec<CategoryUtilization>,
    pub guidance: &'static str,
}

impl BudgetSuggestionPayload {
    pub fn build(transactions: &[Transaction], budgets: &Budget) -> Self {
        let category_averages = category_monthly_averages(transactions);
        let utilization = category_utilization(&category_averages, budgets);
        Self {
            transactions: transactions
                .iter()
                .filter(|t| t.is(TransactionType::Expense))
                .cloned()
                .collect(),
            current_budgets: budgets.clone(),
            category_averages,
            utilization,
            guidance: "Suggest an increase when utilization exceeds 95% and a decrease below 60%; \
                       leave 60-95% alone. Be conservative with essential categories (rent, salaries).",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShareLine {
    pub name: String,
    pub amount: f64,
    pub transactions: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOverviewPayload {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub total_amount: f64,
    pub categories: Vec<CategoryShareLine>,
}

impl CategoryOverviewPayload {
    pub fn build(transactions: &[Transaction], kind: TransactionType) -> Self {
        let total_amount = type_total(transactions, kind);
        let categories = category_breakdown(transactions, kind)
            .into_iter()
            .map(|c| CategoryShareLine {
                percentage: if total_amount > 0.0 {
                    c.amount * 100.0 / total_amount
                } else {
                    0.0
                },
                name: c.name,
                amount: c.amount,
                transactions: c.transactions,
            })
            .collect();
        Self {
            kind,
            total_amount,
            categories,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCategoryLine {
    pub category: String,
    pub spent: f64,
    pub budget: Option<f64>,
    pub utilization: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummaryPayload {
    pub month: YearMonth,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net: f64,
    pub categories: Vec<MonthCategoryLine>,
}

impl MonthSummaryPayload {
    pub fn build(transactions: &[Transaction], budgets: &Budget, month: YearMonth) -> Self {
        let total_income = aggregate::month_total(transactions, TransactionType::Income, month);
        let total_expenses = aggregate::month_total(transactions, TransactionType::Expense, month);
        let mut categories: Vec<MonthCategoryLine> = monthly_category_spend(transactions, month)
            .into_iter()
            .map(|(category, spent)| {
                let budget = budgets.get(&category).copied();
                MonthCategoryLine {
                    utilization: aggregate::budget_utilization(budget.unwrap_or(0.0), spent),
                    category,
                    spent,
                    budget,
                }
            })
            .collect();
        categories.sort_by(|a, b| b.spent.total_cmp(&a.spent));

        Self {
            month,
            total_income,
            total_expenses,
            net: total_income - total_expenses,
            categories,
        }
    }

    pub fn over_budget(&self) -> impl Iterator<Item = &MonthCategoryLine> {
        self.categories.iter().filter(|c| c.utilization >= 100.0)
    }
}
