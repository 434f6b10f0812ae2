pub mod analysis;
pub mod patterns;

use crate::domain::{category_icon, Transaction, TransactionType};
use crate::time::YearMonth;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    Only(TransactionType),
    Both,
}

impl TypeFilter {
    fn accepts(&self, tx: &Transaction) -> bool {
        match self {
            TypeFilter::Only(kind) => tx.is(*kind),
            TypeFilter::Both => true,
        }
    }
}

impl From<TransactionType> for TypeFilter {
    fn from(kind: TransactionType) -> Self {
        TypeFilter::Only(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub key: YearMonth,
    pub month: String,
    pub amount: f64,
}

impl MonthlyPoint {
    fn new(key: YearMonth, amount: f64) -> Self {
        Self {
            key,
            month: key.short_label(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub amount: f64,
    pub transactions: usize,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorTotal {
    pub vendor: String,
    pub amount: f64,
}

/// One point per month that has at least one matching transaction, ascending.
/// Months without activity are absent, not zero.
pub fn monthly_series(transactions: &[Transaction], filter: impl Into<TypeFilter>) -> Vec<MonthlyPoint> {
    let filter = filter.into();
    let mut totals = BTreeMap::<YearMonth, f64>::new();
    for tx in transactions.iter().filter(|t| filter.accepts(t)) {
        *totals.entry(YearMonth::of(tx.date)).or_insert(0.0) += tx.magnitude();
    }

    totals
        .into_iter()
        .map(|(key, amount)| MonthlyPoint::new(key, amount))
        .collect()
}

/// Per-category totals, descending by amount. Ties keep first-seen order.
pub fn category_breakdown(transactions: &[Transaction], kind: TransactionType) -> Vec<CategoryTotal> {
    let mut out: Vec<CategoryTotal> = Vec::new();
    let mut index = HashMap::<&str, usize>::new();
    for tx in transactions.iter().filter(|t| t.is(kind)) {
        let slot = *index.entry(tx.category.as_str()).or_insert_with(|| {
            out.push(CategoryTotal {
                name: tx.category.clone(),
                amount: 0.0,
                transactions: 0,
                icon: category_icon(&tx.category),
            });
            out.len() - 1
        });
        out[slot].amount += tx.magnitude();
        out[slot].transactions += 1;
    }

    // `sort_by` is stable.
    out.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    out
}

/// Per-vendor totals, descending by amount. Ties keep first-seen order.
pub fn vendor_breakdown(transactions: &[Transaction]) -> Vec<VendorTotal> {
    let mut out: Vec<VendorTotal> = Vec::new();
    let mut index = HashMap::<&str, usize>::new();
    for tx in transactions {
        let slot = *index.entry(tx.vendor.as_str()).or_insert_with(|| {
            out.push(VendorTotal {
                vendor: tx.vendor.clone(),
                amount: 0.0,
            });
            out.len() - 1
        });
        out[slot].amount += tx.magnitude();
    }
    out.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    out
}

pub fn type_total(transactions: &[Transaction], kind: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|t| t.is(kind))
        .map(Transaction::magnitude)
        .sum()
}

pub fn month_total(transactions: &[Transaction], kind: TransactionType, month: YearMonth) -> f64 {
    transactions
        .iter()
        .filter(|t| t.is(kind) && month.contains(t.date))
        .map(Transaction::magnitude)
        .sum()
}

pub fn current_month_total(transactions: &[Transaction], kind: TransactionType, today: NaiveDate) -> f64 {
    month_total(transactions, kind, YearMonth::of(today))
}

pub fn previous_month_total(transactions: &[Transaction], kind: TransactionType, today: NaiveDate) -> f64 {
    month_total(transactions, kind, YearMonth::of(today).previous())
}

/// Whole-percent change from `previous` to `current`.
///
/// Returns 0 when `previous` is 0, whatever `current` is. This hides growth
/// from nothing; callers that care must check `previous` themselves.
pub fn percentage_change(current: f64, previous: f64) -> i64 {
    if previous == 0.0 {
        return 0;
    }
    (((current - previous) / previous) * 100.0).round() as i64
}

/// `spent` as a percentage of `budget`; 0 when there is no positive budget.
pub fn budget_utilization(budget: f64, spent: f64) -> f64 {
    if budget > 0.0 {
        spent * 100.0 / budget
    } else {
        0.0
    }
}

/// Expense totals per category for a single month.
pub fn monthly_category_spend(transactions: &[Transaction], month: YearMonth) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    for tx in transactions
        .iter()
        .filter(|t| t.is(TransactionType::Expense) && month.contains(t.date))
    {
        *out.entry(tx.category.clone()).or_insert(0.0) += tx.magnitude();
    }
    out
}

/// For each expense category, the mean of its monthly totals over the months
/// in which it has spending.
pub fn category_monthly_averages(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut per_month = BTreeMap::<&str, BTreeMap<YearMonth, f64>>::new();
    for tx in transactions.iter().filter(|t| t.is(TransactionType::Expense)) {
        *per_month
            .entry(tx.category.as_str())
            .or_default()
            .entry(YearMonth::of(tx.date))
            .or_insert(0.0) += tx.magnitude();
    }

    per_month
        .into_iter()
        .map(|(category, months)| {
            let avg = months.values().sum::<f64>() / months.len() as f64;
            (category.to_string(), avg)
        })
        .collect()
}

/// `n` consecutive months ending with today's month, ascending, zero-filled.
pub fn trailing_months(
    transactions: &[Transaction],
    kind: TransactionType,
    today: NaiveDate,
    n: usize,
) -> Vec<MonthlyPoint> {
    let current = YearMonth::of(today);
    (0..n as i32)
        .rev()
        .map(|back| {
            let key = current.offset(-back);
            MonthlyPoint::new(key, month_total(transactions, kind, key))
        })
        .collect()
}
