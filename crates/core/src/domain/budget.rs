use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category name -> monthly ceiling.
pub type Budget = BTreeMap<String, f64>;

const DEFAULT_BUDGETS: [(&str, f64); 12] = [
    ("Rent", 3000.0),
    ("Salaries", 7000.0),
    ("Utilities", 350.0),
    ("Marketing", 500.0),
    ("Office Supplies", 200.0),
    ("Food & Beverage", 300.0),
    ("Transportation", 150.0),
    ("Travel", 1000.0),
    ("Professional Services", 800.0),
    ("Insurance", 400.0),
    ("Equipment", 600.0),
    ("Software", 300.0),
];

pub fn default_budgets() -> Budget {
    DEFAULT_BUDGETS
        .iter()
        .map(|(name, amount)| (name.to_string(), *amount))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Caution,
    Safe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    #[serde(rename = "Over Budget")]
    OverBudget,
    #[serde(rename = "Near Limit")]
    NearLimit,
    #[serde(rename = "On Track")]
    OnTrack,
    Good,
}

impl BudgetStatus {
    /// Band for a utilization percentage (see `aggregate::budget_utilization`).
    pub fn from_utilization(percent: f64) -> Self {
        if percent >= 100.0 {
            BudgetStatus::OverBudget
        } else if percent >= 90.0 {
            BudgetStatus::NearLimit
        } else if percent >= 75.0 {
            BudgetStatus::OnTrack
        } else {
            BudgetStatus::Good
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            BudgetStatus::OverBudget => Severity::Critical,
            BudgetStatus::NearLimit => Severity::Warning,
            BudgetStatus::OnTrack => Severity::Caution,
            BudgetStatus::Good => Severity::Safe,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BudgetStatus::OverBudget => "Over Budget",
            BudgetStatus::NearLimit => "Near Limit",
            BudgetStatus::OnTrack => "On Track",
            BudgetStatus::Good => "Good",
        }
    }
}
