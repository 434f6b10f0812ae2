use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum BudgetError {
    SaveFailed,
    EmptyCategory,
    DuplicateCategory(String),
    InvalidAmount { category: String, amount: f64 },
}

impl fmt::Display for BudgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetError::SaveFailed => write!(f, "failed to save budgets; previous budgets kept"),
            BudgetError::EmptyCategory => write!(f, "category name must be non-empty"),
            BudgetError::DuplicateCategory(name) => write!(f, "category already exists: {name}"),
            BudgetError::InvalidAmount { category, amount } => {
                write!(f, "invalid budget amount for {category}: {amount}")
            }
        }
    }
}

impl std::error::Error for BudgetError {}
