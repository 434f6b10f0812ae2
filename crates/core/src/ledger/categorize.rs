use crate::domain::TransactionType;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySuggestion {
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

struct Rule {
    category: &'static str,
    kind: TransactionType,
    vendor: &'static [&'static str],
    description: &'static [&'static str],
}

// Evaluated in order; the first match wins.
const RULES: &[Rule] = &[
    Rule {
        category: "Rent",
        kind: TransactionType::Expense,
        vendor: &["landlord"],
        description: &["rent"],
    },
    Rule {
        category: "Salaries",
        kind: TransactionType::Expense,
        vendor: &["payroll"],
        description: &["salary"],
    },
    Rule {
        category: "Utilities",
        kind: TransactionType::Expense,
        vendor: &["utility"],
        description: &["electric", "water"],
    },
    Rule {
        category: "Food & Beverage",
        kind: TransactionType::Expense,
        vendor: &["restaurant", "coffee"],
        description: &["food", "lunch"],
    },
    Rule {
        category: "Transportation",
        kind: TransactionType::Expense,
        vendor: &["uber", "taxi", "gas"],
        description: &["transport"],
    },
    Rule {
        category: "Office Supplies",
        kind: TransactionType::Expense,
        vendor: &["staples", "office"],
        description: &["supplies"],
    },
    Rule {
        category: "Marketing",
        kind: TransactionType::Expense,
        vendor: &["ads", "marketing"],
        description: &["campaign"],
    },
    Rule {
        category: "Consulting",
        kind: TransactionType::Income,
        vendor: &["client"],
        description: &["consulting", "project"],
    },
    Rule {
        category: "Product Sales",
        kind: TransactionType::Income,
        vendor: &["store", "sales"],
        description: &["product"],
    },
    Rule {
        category: "Travel",
        kind: TransactionType::Expense,
        vendor: &["airline"],
        description: &["travel", "conference"],
    },
];

/// Keyword-based category guess for the smart-add flow. Falls back to the
/// amount sign when no rule matches.
pub fn categorize(vendor: &str, description: &str, amount: f64) -> CategorySuggestion {
    let vendor = vendor.to_lowercase();
    let description = description.to_lowercase();

    let hit = RULES.iter().find(|rule| {
        rule.vendor.iter().any(|k| vendor.contains(k))
            || rule.description.iter().any(|k| description.contains(k))
    });

    match hit {
        Some(rule) => CategorySuggestion {
            category: rule.category.to_string(),
            kind: rule.kind,
        },
        None if amount > 0.0 => CategorySuggestion {
            category: "Other Income".to_string(),
            kind: TransactionType::Income,
        },
        None => CategorySuggestion {
            category: "Other Expense".to_string(),
            kind: TransactionType::Expense,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_vendor_keywords() {
        let s = categorize("Uber", "Ride to airport", 25.0);
        assert_eq!(s.category, "Transportation");
        assert_eq!(s.kind, TransactionType::Expense);
    }

    #[test]
    fn matches_description_keywords() {
        let s = categorize("Acme", "Project kickoff payment", 1500.0);
        assert_eq!(s.category, "Consulting");
        assert_eq!(s.kind, TransactionType::Income);
    }

    #[test]
    fn earlier_rules_take_precedence() {
        // "office rent" hits Rent before Office Supplies.
        let s = categorize("Office Landlord", "Office rent", 3000.0);
        assert_eq!(s.category, "Rent");
    }

    #[test]
    fn falls_back_to_amount_sign() {
        assert_eq!(categorize("Zed", "misc", 10.0).category, "Other Income");
        assert_eq!(categorize("Zed", "misc", -10.0).category, "Other Expense");
        assert_eq!(categorize("Zed", "misc", 0.0).kind, TransactionType::Expense);
    }
}
