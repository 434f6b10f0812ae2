use crate::aggregate::category_breakdown;
use crate::domain::{Tab, TransactionType};
use crate::insight::request::{
    AnalyticsPayload, BudgetSuggestionPayload, CategoryDetailPayload, CategoryOverviewPayload,
    ChartTrendPayload, DashboardPayload, MonthSummaryPayload, QuickInsightPayload, TrendDirection,
};
use crate::insight::response::{
    AnalyticsDetail, AnalyticsInsight, BudgetSuggestion, DashboardDetail, DashboardInsight,
    Predictions,
};
use crate::insight::suggest::local_suggestions;

/// Whole dollars with thousands separators, e.g. `$12,345` or `-$80`.
pub fn money(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn tab_label(tab: Tab) -> &'static str {
    match tab {
        Tab::Income => "Revenue",
        Tab::Expenses => "Expense",
    }
}

fn kind_noun(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Income => "income",
        TransactionType::Expense => "expenses",
    }
}

pub fn dashboard(p: &DashboardPayload) -> DashboardInsight {
    let outcome = if p.net_profit >= 0.0 { "profit" } else { "loss" };
    let brief = format!(
        "Net {outcome} of {} on {} income ({:.1}% margin).",
        money(p.net_profit.abs()),
        money(p.total_income),
        p.profit_margin
    );

    let mut key_insights = vec![format!(
        "{} in expenses across {} transactions.",
        money(p.total_expenses),
        p.transaction_count
    )];
    if let Some(top) = category_breakdown(&p.transactions, TransactionType::Expense).first() {
        key_insights.push(format!(
            "{} is the largest recent expense category at {}.",
            top.name,
            money(top.amount)
        ));
    }

    let recommendations = if p.net_profit < 0.0 {
        vec![
            "Review the largest expense categories for savings.".to_string(),
            "Look for ways to grow recurring income.".to_string(),
        ]
    } else {
        vec!["Set aside part of the surplus as a cash reserve.".to_string()]
    };

    DashboardInsight {
        brief,
        detailed: DashboardDetail {
            overview: format!(
                "Income {}, expenses {}, net {}.",
                money(p.total_income),
                money(p.total_expenses),
                money(p.net_profit)
            ),
            key_insights,
            recommendations,
            monitoring: vec!["Track monthly spend against budgets.".to_string()],
        },
    }
}

pub fn analytics(p: &AnalyticsPayload) -> AnalyticsInsight {
    let label = tab_label(p.selected_tab);
    let top_categories = if p.category_breakdown.is_empty() {
        "No categories recorded yet.".to_string()
    } else {
        p.category_breakdown
            .iter()
            .take(3)
            .map(|c| format!("{} ({})", c.name, money(c.amount)))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let trends = match p.monthly_trend.as_slice() {
        [.., prev, last] => format!(
            "{} in {} versus {} in {}.",
            money(last.amount),
            last.month,
            money(prev.amount),
            prev.month
        ),
        _ => "Not enough history to show a trend.".to_string(),
    };

    let average = if p.transaction_count > 0 {
        p.total_amount / p.transaction_count as f64
    } else {
        0.0
    };

    AnalyticsInsight {
        summary: format!("{label} analysis complete. Total: {}", money(p.total_amount)),
        analysis: AnalyticsDetail {
            trends,
            top_categories,
            patterns: format!(
                "{} transactions averaging {} each.",
                p.transaction_count,
                money(average)
            ),
        },
        recommendations: vec![
            "Review category performance".to_string(),
            "Monitor monthly trends".to_string(),
        ],
        predictions: Predictions {
            next_month: "Trends suggest continued performance".to_string(),
            advice: "Continue monitoring key metrics".to_string(),
        },
        alerts: Vec::new(),
    }
}

pub fn budget_suggestions(p: &BudgetSuggestionPayload) -> Vec<BudgetSuggestion> {
    local_suggestions(&p.utilization)
}

pub fn category_detail(p: &CategoryDetailPayload) -> String {
    if p.transaction_count == 0 {
        return format!("No {} recorded for {} yet.", kind_noun(p.kind), p.category);
    }
    let mut text = format!(
        "{} totals {} across {} transactions, averaging {}.",
        p.category,
        money(p.total_amount),
        p.transaction_count,
        money(p.average_amount)
    );
    if let Some(top) = p.top_vendors.first() {
        text.push_str(&format!(" Top vendor: {} ({}).", top.vendor, money(top.amount)));
    }
    text
}

pub fn chart_trend(p: &ChartTrendPayload) -> String {
    let noun = match p.tab {
        Tab::Income => "Income",
        Tab::Expenses => "Expenses",
    };
    let movement = match p.trend_direction {
        TrendDirection::Growing => format!("grew {:.1}%", p.overall_change),
        TrendDirection::Declining => format!("fell {:.1}%", p.overall_change.abs()),
        TrendDirection::Stable => "held steady".to_string(),
    };
    format!(
        "{noun} {movement} over the period, peaking in {} at {} with a low of {} in {}.",
        p.peak.month,
        money(p.peak.amount),
        money(p.trough.amount),
        p.trough.month
    )
}

pub fn quick_insight(p: &QuickInsightPayload) -> String {
    let noun = match p.tab {
        Tab::Income => "Income",
        Tab::Expenses => "Spending",
    };
    match p.percentage_change {
        0 => format!("{noun} this month: {}, flat against last month.", money(p.current_total)),
        c if c > 0 => format!("{noun} this month: {}, up {c}% from last month.", money(p.current_total)),
        c => format!(
            "{noun} this month: {}, down {}% from last month.",
            money(p.current_total),
            c.abs()
        ),
    }
}

pub fn category_overview(p: &CategoryOverviewPayload) -> String {
    match p.categories.first() {
        Some(top) => format!(
            "{} leads {} with {} ({:.0}% of {}) across {} categories.",
            top.name,
            kind_noun(p.kind),
            money(top.amount),
            top.percentage,
            money(p.total_amount),
            p.categories.len()
        ),
        None => format!("No {} recorded yet.", kind_noun(p.kind)),
    }
}

pub fn month_summary(p: &MonthSummaryPayload) -> String {
    let mut text = format!(
        "{}: income {}, expenses {}, net {}.",
        p.month,
        money(p.total_income),
        money(p.total_expenses),
        money(p.net)
    );
    let over: Vec<&str> = p.over_budget().map(|c| c.category.as_str()).collect();
    if over.is_empty() {
        text.push_str(" All categories are within budget.");
    } else {
        text.push_str(&format!(" Over budget: {}.", over.join(", ")));
    }
    text
}
