pub mod budget;
pub mod transaction;

pub use budget::{default_budgets, Budget, BudgetStatus, Severity};
pub use transaction::{category_icon, Tab, Transaction, TransactionType};
