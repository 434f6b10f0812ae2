use crate::aggregate::monthly_category_spend;
use crate::domain::Transaction;
use crate::time::YearMonth;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Change (in percent) beyond which a category counts as trending.
const TREND_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingPattern {
    pub category: String,
    pub trend: Trend,
    pub weekly_average: f64,
    pub monthly_total: f64,
    pub previous_month_total: f64,
    pub change_percentage: f64,
    pub recommendation: String,
}

/// Month-over-month expense movement per category for today's month.
///
/// Only categories with spending this month are returned, largest first.
pub fn spending_patterns(transactions: &[Transaction], today: NaiveDate) -> Vec<SpendingPattern> {
    let month = YearMonth::of(today);
    let current = monthly_category_spend(transactions, month);
    let previous = monthly_category_spend(transactions, month.previous());
    let weeks_in_month = month.days() as f64 / 7.0;

    let categories: BTreeSet<&String> = current.keys().chain(previous.keys()).collect();
    let mut out: Vec<SpendingPattern> = categories
        .into_iter()
        .filter_map(|category| {
            let now = current.get(category).copied().unwrap_or(0.0);
            if now <= 0.0 {
                return None;
            }
            let before = previous.get(category).copied().unwrap_or(0.0);
            let change = if before > 0.0 {
                (now - before) / before * 100.0
            } else {
                0.0
            };
            let trend = if change.abs() > TREND_THRESHOLD {
                if change > 0.0 {
                    Trend::Increasing
                } else {
                    Trend::Decreasing
                }
            } else {
                Trend::Stable
            };

            Some(SpendingPattern {
                category: category.clone(),
                trend,
                weekly_average: now / weeks_in_month,
                monthly_total: now,
                previous_month_total: before,
                change_percentage: change,
                recommendation: recommendation(category, trend, change, now),
            })
        })
        .collect();

    out.sort_by(|a, b| b.monthly_total.total_cmp(&a.monthly_total));
    out
}

fn recommendation(category: &str, trend: Trend, change: f64, amount: f64) -> String {
    if trend == Trend::Increasing && change > 20.0 {
        return match category {
            "Food & Beverage" => "Consider meal planning or team lunch budgets to control costs".to_string(),
            "Office Supplies" => "Review bulk purchasing options or negotiate vendor discounts".to_string(),
            "Marketing" => "Analyze ROI of current campaigns and optimize ad spend".to_string(),
            "Transportation" => "Explore carpooling or public transport options for cost savings".to_string(),
            "Utilities" => "Implement energy-saving measures or review utility providers".to_string(),
            _ => format!("Monitor {category} expenses closely as spending has increased significantly"),
        };
    }
    if trend == Trend::Decreasing && change < -15.0 {
        return format!(
            "Great! {category} costs are down {:.1}% - maintain current practices",
            change.abs()
        );
    }
    if amount > 1000.0 {
        return match category {
            "Rent" => "Consider renegotiating lease terms or exploring co-working spaces".to_string(),
            "Salaries" => "Review productivity metrics and consider performance-based compensation".to_string(),
            _ => format!("{category} is a major expense - review for optimization opportunities"),
        };
    }
    format!("{category} spending is stable - continue monitoring")
}
