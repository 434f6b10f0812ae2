use crate::domain::{Transaction, TransactionType};
use crate::ledger::categorize::categorize;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::RwLock;

/// Smart-add input. Category and type are guessed when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub vendor: String,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionType>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl NewTransaction {
    /// Validates the entry and produces the sign-normalized transaction.
    pub fn into_transaction(self, today: NaiveDate) -> anyhow::Result<Transaction> {
        let vendor = self.vendor.trim().to_string();
        let description = self.description.trim().to_string();
        anyhow::ensure!(!vendor.is_empty(), "vendor must be non-empty");
        anyhow::ensure!(!description.is_empty(), "description must be non-empty");
        anyhow::ensure!(self.amount.is_finite(), "amount must be a finite number");

        let guess = categorize(&vendor, &description, self.amount);
        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or(guess.category);
        let kind = self.kind.unwrap_or(guess.kind);

        Ok(Transaction::new(
            self.date.unwrap_or(today),
            vendor,
            category,
            self.amount,
            kind,
            description,
        ))
    }
}

/// Ordered, append-only transaction ledger shared by every view.
#[derive(Debug, Default)]
pub struct LedgerStore {
    entries: RwLock<Vec<Transaction>>,
}

impl LedgerStore {
    pub fn new(entries: Vec<Transaction>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn seeded() -> Self {
        Self::new(crate::ledger::seed_transactions())
    }

    /// Copy of the ledger at this instant, in insertion order.
    pub fn snapshot(&self) -> Vec<Transaction> {
        match self.entries.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn of_type(&self, kind: TransactionType) -> Vec<Transaction> {
        self.snapshot().into_iter().filter(|t| t.is(kind)).collect()
    }

    pub fn in_category(&self, category: &str, kind: TransactionType) -> Vec<Transaction> {
        self.snapshot()
            .into_iter()
            .filter(|t| t.is(kind) && t.category == category)
            .collect()
    }

    /// The only mutation: append a validated entry and return it.
    pub fn append(&self, entry: NewTransaction, today: NaiveDate) -> anyhow::Result<Transaction> {
        let tx = entry.into_transaction(today)?;
        let mut guard = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(tx.clone());
        tracing::info!(
            vendor = %tx.vendor,
            category = %tx.category,
            kind = %tx.kind,
            amount = tx.amount(),
            ledger_len = guard.len(),
            "transaction appended"
        );
        Ok(tx)
    }
}
