pub mod error;
pub mod store;

pub use error::BudgetError;
pub use store::{BudgetStore, InMemoryBudgetStore};

use crate::aggregate::budget_utilization;
use crate::domain::{Budget, BudgetStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Budgets as last loaded or successfully saved. The store never merges:
/// callers build the complete next mapping with the helpers below.
pub struct BudgetSession {
    store: Arc<dyn BudgetStore>,
    current: Budget,
}

impl BudgetSession {
    pub async fn open(store: Arc<dyn BudgetStore>) -> Self {
        let current = store.load().await;
        Self { store, current }
    }

    pub fn current(&self) -> &Budget {
        &self.current
    }

    pub async fn reload(&mut self) -> &Budget {
        self.current = self.store.load().await;
        &self.current
    }

    /// Persists `next`. On failure the last-known-good budgets stay in place.
    pub async fn save(&mut self, next: Budget) -> Result<&Budget, BudgetError> {
        validate(&next)?;
        if !self.store.save(next.clone()).await {
            return Err(BudgetError::SaveFailed);
        }
        self.current = next;
        Ok(&self.current)
    }
}

/// Every category named and every ceiling finite and non-negative.
pub fn validate(budget: &Budget) -> Result<(), BudgetError> {
    for (category, &amount) in budget {
        if category.trim().is_empty() {
            return Err(BudgetError::EmptyCategory);
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(BudgetError::InvalidAmount {
                category: category.clone(),
                amount,
            });
        }
    }
    Ok(())
}

/// Applies raw text edits. Entries that do not parse as a non-negative number
/// are ignored.
pub fn apply_edits(budget: &Budget, edits: &BTreeMap<String, String>) -> Budget {
    let mut next = budget.clone();
    for (category, raw) in edits {
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => {
                next.insert(category.clone(), v);
            }
            _ => tracing::debug!(%category, %raw, "ignoring invalid budget edit"),
        }
    }
    next
}

pub fn with_category(budget: &Budget, name: &str, amount: f64) -> Result<Budget, BudgetError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BudgetError::EmptyCategory);
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(BudgetError::InvalidAmount {
            category: name.to_string(),
            amount,
        });
    }
    if budget.contains_key(name) {
        return Err(BudgetError::DuplicateCategory(name.to_string()));
    }
    let mut next = budget.clone();
    next.insert(name.to_string(), amount);
    Ok(next)
}

pub fn without_category(budget: &Budget, name: &str) -> Budget {
    let mut next = budget.clone();
    next.remove(name);
    next
}

/// Overwrites (or adds) the given categories' ceilings.
pub fn apply_suggestions<'a>(budget: &Budget, suggestions: impl IntoIterator<Item = (&'a str, f64)>) -> Budget {
    let mut next = budget.clone();
    for (category, amount) in suggestions {
        next.insert(category.to_string(), amount);
    }
    next
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLine {
    pub category: String,
    pub budget: f64,
    pub spent: f64,
    pub remaining: f64,
    pub utilization: f64,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverview {
    pub total_budget: f64,
    pub total_spent: f64,
    pub remaining: f64,
    pub spent_percentage: f64,
    pub lines: Vec<BudgetLine>,
}

/// Budget vs. spend per category, alphabetical. Spending in categories with
/// no budget counts toward the total but has no line.
pub fn budget_overview(budget: &Budget, spent: &BTreeMap<String, f64>) -> BudgetOverview {
    let lines: Vec<BudgetLine> = budget
        .iter()
        .map(|(category, &ceiling)| {
            let used = spent.get(category).copied().unwrap_or(0.0);
            let utilization = budget_utilization(ceiling, used);
            BudgetLine {
                category: category.clone(),
                budget: ceiling,
                spent: used,
                remaining: ceiling - used,
                utilization,
                status: BudgetStatus::from_utilization(utilization),
            }
        })
        .collect();

    let total_budget: f64 = budget.values().sum();
    let total_spent: f64 = spent.values().sum();
    BudgetOverview {
        total_budget,
        total_spent,
        remaining: total_budget - total_spent,
        spent_percentage: budget_utilization(total_budget, total_spent),
        lines,
    }
}
