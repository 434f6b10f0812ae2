pub mod categorize;
pub mod seed;
pub mod store;

pub use categorize::{categorize, CategorySuggestion};
pub use seed::seed_transactions;
pub use store::{LedgerStore, NewTransaction};
