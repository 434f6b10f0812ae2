use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = anyhow::Error;

    /// Accepts the canonical names plus the tab names used by the front-end
    /// ("income", "expenses").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" | "expenses" => Ok(TransactionType::Expense),
            other => anyhow::bail!("unknown transaction type: {other}"),
        }
    }
}

/// Analytics tab selector as the front-end names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Income,
    Expenses,
}

impl Tab {
    pub fn kind(&self) -> TransactionType {
        match self {
            Tab::Income => TransactionType::Income,
            Tab::Expenses => TransactionType::Expense,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Income => "income",
            Tab::Expenses => "expenses",
        }
    }
}

impl From<TransactionType> for Tab {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Income => Tab::Income,
            TransactionType::Expense => Tab::Expenses,
        }
    }
}

impl FromStr for Tab {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<TransactionType>().map(Tab::from)
    }
}

/// An immutable ledger entry.
///
/// The amount sign always follows `kind`: expenses are stored negative and
/// income positive, whatever sign the source supplied. Aggregations should
/// still go through [`Transaction::magnitude`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransactionRecord")]
pub struct Transaction {
    pub date: NaiveDate,
    pub vendor: String,
    pub category: String,
    amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        vendor: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
        kind: TransactionType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date,
            vendor: vendor.into(),
            category: category.into(),
            amount: signed_amount(amount, kind),
            kind,
            description: description.into(),
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }

    pub fn is(&self, kind: TransactionType) -> bool {
        self.kind == kind
    }
}

fn signed_amount(amount: f64, kind: TransactionType) -> f64 {
    match kind {
        TransactionType::Income => amount.abs(),
        TransactionType::Expense => -amount.abs(),
    }
}

/// Wire shape of a transaction before sign normalization.
#[derive(Debug, Clone, Deserialize)]
struct TransactionRecord {
    date: NaiveDate,
    vendor: String,
    category: String,
    amount: f64,
    #[serde(rename = "type")]
    kind: TransactionType,
    #[serde(default)]
    description: String,
}

impl From<TransactionRecord> for Transaction {
    fn from(r: TransactionRecord) -> Self {
        Transaction::new(r.date, r.vendor, r.category, r.amount, r.kind, r.description)
    }
}

/// Ionicons tag shown next to a category.
pub fn category_icon(category: &str) -> &'static str {
    match category {
        "Rent" => "home-outline",
        "Salaries" => "people-outline",
        "Utilities" => "flash-outline",
        "Office Supplies" => "cube-outline",
        "Marketing" => "megaphone-outline",
        "Food & Beverage" => "restaurant-outline",
        "Transportation" => "car-outline",
        "Travel" => "airplane-outline",
        "Consulting" => "briefcase-outline",
        "Product Sales" => "storefront-outline",
        _ => "document-outline",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_sign_on_construction() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let rent = Transaction::new(d, "Landlord", "Rent", 3000.0, TransactionType::Expense, "");
        assert_eq!(rent.amount(), -3000.0);
        assert_eq!(rent.magnitude(), 3000.0);

        let sale = Transaction::new(d, "Store", "Product Sales", -850.0, TransactionType::Income, "");
        assert_eq!(sale.amount(), 850.0);
    }

    #[test]
    fn deserializes_and_normalizes_wire_records() {
        let v = json!({
            "date": "2025-02-02",
            "vendor": "Payroll",
            "category": "Salaries",
            "amount": 7000,
            "type": "Expense",
            "description": "Team salaries"
        });
        let t: Transaction = serde_json::from_value(v).unwrap();
        assert_eq!(t.amount(), -7000.0);
        assert_eq!(t.kind, TransactionType::Expense);

        let out = serde_json::to_value(&t).unwrap();
        assert_eq!(out["type"], "Expense");
        assert_eq!(out["amount"], -7000.0);
    }

    #[test]
    fn rejects_invalid_dates() {
        let v = json!({
            "date": "2025-02-30",
            "vendor": "x",
            "category": "y",
            "amount": 1,
            "type": "Income"
        });
        assert!(serde_json::from_value::<Transaction>(v).is_err());
    }

    #[test]
    fn parses_tab_names() {
        assert_eq!("expenses".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert_eq!("Income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert!("transfers".parse::<TransactionType>().is_err());
    }

    #[test]
    fn unknown_categories_get_default_icon() {
        assert_eq!(category_icon("Rent"), "home-outline");
        assert_eq!(category_icon("Crypto"), "document-outline");
    }
}
