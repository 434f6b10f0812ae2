use crate::aggregate::{category_breakdown, type_total};
use crate::domain::{Transaction, TransactionType};
use serde::Serialize;

const TOP_CATEGORIES: usize = 5;
const UNUSUAL_MULTIPLIER: f64 = 2.5;
const SAVINGS_RATE: f64 = 0.15;
const OPTIMIZABLE: [&str; 4] = ["Food & Beverage", "Office Supplies", "Marketing", "Transportation"];
const ESSENTIAL: [&str; 2] = ["Rent", "Salaries"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowTrend {
    Positive,
    Negative,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInsights {
    pub total_spending: f64,
    pub total_income: f64,
    pub top_spending_categories: Vec<CategoryShare>,
    pub unusual_transactions: Vec<Transaction>,
    pub savings_opportunities: f64,
    pub profit_margin: f64,
    pub cash_flow_trend: CashFlowTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Savings,
    Profit,
    Optimization,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<f64>,
    pub action_required: bool,
}

pub fn analyze_transactions(transactions: &[Transaction]) -> TransactionInsights {
    let total_spending = type_total(transactions, TransactionType::Expense);
    let total_income = type_total(transactions, TransactionType::Income);
    let breakdown = category_breakdown(transactions, TransactionType::Expense);

    let top_spending_categories = breakdown
        .iter()
        .take(TOP_CATEGORIES)
        .map(|c| CategoryShare {
            category: c.name.clone(),
            amount: c.amount,
            percentage: share(c.amount, total_spending),
        })
        .collect();

    let expense_count = transactions
        .iter()
        .filter(|t| t.is(TransactionType::Expense))
        .count();
    let unusual_transactions = if expense_count == 0 {
        Vec::new()
    } else {
        let threshold = total_spending / expense_count as f64 * UNUSUAL_MULTIPLIER;
        transactions
            .iter()
            .filter(|t| t.is(TransactionType::Expense) && t.magnitude() > threshold)
            .cloned()
            .collect()
    };

    let savings_opportunities = breakdown
        .iter()
        .filter(|c| OPTIMIZABLE.contains(&c.name.as_str()))
        .map(|c| c.amount * SAVINGS_RATE)
        .sum();

    let profit_margin = if total_income > 0.0 {
        (total_income - total_spending) * 100.0 / total_income
    } else {
        0.0
    };

    let cash_flow_trend = if total_income > total_spending {
        CashFlowTrend::Positive
    } else if total_income < total_spending {
        CashFlowTrend::Negative
    } else {
        CashFlowTrend::Stable
    };

    TransactionInsights {
        total_spending,
        total_income,
        top_spending_categories,
        unusual_transactions,
        savings_opportunities,
        profit_margin,
        cash_flow_trend,
    }
}

/// Ranked recommendations, highest impact first.
pub fn recommendations(insights: &TransactionInsights, transactions: &[Transaction]) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    for (index, cat) in insights.top_spending_categories.iter().enumerate() {
        if cat.percentage > 15.0 && !ESSENTIAL.contains(&cat.category.as_str()) {
            recs.push(Recommendation {
                id: format!("savings-{index}"),
                kind: RecommendationKind::Savings,
                title: format!("Optimize {} Spending", cat.category),
                description: format!(
                    "You're spending ${:.2} ({:.1}%) on {}. Consider reviewing vendors or negotiating better rates.",
                    cat.amount, cat.percentage, cat.category
                ),
                impact: if cat.percentage > 25.0 { Impact::High } else { Impact::Medium },
                category: cat.category.clone(),
                potential_savings: Some(cat.amount * SAVINGS_RATE),
                action_required: true,
            });
        }
    }

    if insights.profit_margin < 20.0 {
        recs.push(Recommendation {
            id: "profit-margin".to_string(),
            kind: RecommendationKind::Profit,
            title: "Improve Profit Margins".to_string(),
            description: format!(
                "Your current profit margin is {:.1}%. Consider increasing prices or reducing operational costs.",
                insights.profit_margin
            ),
            impact: Impact::High,
            category: "Revenue".to_string(),
            potential_savings: Some(insights.total_spending * 0.1),
            action_required: true,
        });
    }

    if insights.cash_flow_trend == CashFlowTrend::Negative {
        recs.push(Recommendation {
            id: "cashflow".to_string(),
            kind: RecommendationKind::Alert,
            title: "Negative Cash Flow Alert".to_string(),
            description: "Your expenses exceed income this period. Review discretionary spending and consider increasing revenue streams.".to_string(),
            impact: Impact::High,
            category: "Cash Flow".to_string(),
            potential_savings: None,
            action_required: true,
        });
    }

    let recurring: f64 = transactions
        .iter()
        .filter(|t| t.is(TransactionType::Expense) && is_recurring(t))
        .map(Transaction::magnitude)
        .sum();
    if recurring > 0.0 {
        recs.push(Recommendation {
            id: "recurring-costs".to_string(),
            kind: RecommendationKind::Optimization,
            title: "Review Recurring Expenses".to_string(),
            description: format!(
                "You have ${recurring:.2} in recurring expenses. Audit subscriptions and negotiate better rates for utilities."
            ),
            impact: Impact::Medium,
            category: "Recurring Costs".to_string(),
            potential_savings: Some(recurring * 0.1),
            action_required: false,
        });
    }

    if !insights.unusual_transactions.is_empty() {
        recs.push(Recommendation {
            id: "unusual-transactions".to_string(),
            kind: RecommendationKind::Alert,
            title: "Unusual Spending Detected".to_string(),
            description: format!(
                "{} transactions are significantly higher than average. Review for accuracy.",
                insights.unusual_transactions.len()
            ),
            impact: Impact::Medium,
            category: "Anomaly Detection".to_string(),
            potential_savings: None,
            action_required: true,
        });
    }

    recs.sort_by(|a, b| b.impact.cmp(&a.impact));
    recs
}

fn share(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        amount * 100.0 / total
    } else {
        0.0
    }
}

fn is_recurring(tx: &Transaction) -> bool {
    tx.description.to_lowercase().contains("subscription")
        || tx.vendor.to_lowercase().contains("monthly")
        || matches!(tx.category.as_str(), "Utilities" | "Rent")
}
