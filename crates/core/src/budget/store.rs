use crate::domain::{default_budgets, Budget};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Budget persistence seam.
///
/// Implementors provide raw `read`/`write`; callers use `load`/`save`, which
/// apply the fail-soft contract: `load` never errors (falls back to the
/// default set) and `save` reports success as a flag.
#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// `Ok(None)` means nothing has been saved yet.
    async fn read(&self) -> anyhow::Result<Option<Budget>>;

    /// Replaces the whole mapping.
    async fn write(&self, budget: &Budget) -> anyhow::Result<()>;

    async fn load(&self) -> Budget {
        match self.read().await {
            Ok(Some(budget)) => budget,
            Ok(None) => default_budgets(),
            Err(err) => {
                tracing::error!(error = %err, "failed to load budgets; using defaults");
                default_budgets()
            }
        }
    }

    async fn save(&self, budget: Budget) -> bool {
        if let Some((category, amount)) = budget.iter().find(|(_, v)| !v.is_finite() || **v < 0.0) {
            tracing::warn!(%category, amount, "refusing to save invalid budget ceiling");
            return false;
        }
        match self.write(&budget).await {
            Ok(()) => {
                tracing::info!(categories = budget.len(), "budgets saved");
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to save budgets");
                false
            }
        }
    }
}

/// Process-local store. Concurrent saves are last-write-wins.
#[derive(Debug, Default)]
pub struct InMemoryBudgetStore {
    saved: RwLock<Option<Budget>>,
}

impl InMemoryBudgetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(budget: Budget) -> Self {
        Self {
            saved: RwLock::new(Some(budget)),
        }
    }
}

#[async_trait]
impl BudgetStore for InMemoryBudgetStore {
    async fn read(&self) -> anyhow::Result<Option<Budget>> {
        Ok(self.saved.read().await.clone())
    }

    async fn write(&self, budget: &Budget) -> anyhow::Result<()> {
        *self.saved.write().await = Some(budget.clone());
        Ok(())
    }
}
