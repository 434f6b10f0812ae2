use crate::domain::{Transaction, TransactionType};
use chrono::NaiveDate;

use crate::domain::TransactionType::{Expense, Income};

/// Sample business ledger for January through mid-July 2025.
const SEED: [(&str, &str, &str, f64, TransactionType, &str); 62] = [
    ("2025-01-02", "Landlord", "Rent", 3000.0, Expense, "Office rent"),
    ("2025-01-02", "Payroll", "Salaries", 7000.0, Expense, "Team salaries"),
    ("2025-01-05", "Utility Co", "Utilities", 285.5, Expense, "Monthly utilities"),
    ("2025-01-10", "Staples", "Office Supplies", 120.0, Expense, "Printer paper"),
    ("2025-01-12", "Google Ads", "Marketing", 150.0, Expense, "Ad campaign"),
    ("2025-01-14", "Coffee Shop", "Food & Beverage", 18.75, Expense, "Client meeting"),
    ("2025-01-15", "Client A", "Consulting", 1200.0, Income, "Project Alpha"),
    ("2025-01-18", "Uber", "Transportation", 32.5, Expense, "Client visit"),
    ("2025-01-20", "Online Store", "Product Sales", 850.0, Income, "Product X"),
    ("2025-01-25", "Office Depot", "Office Supplies", 45.0, Expense, "Printer ink"),
    ("2025-02-01", "Landlord", "Rent", 3000.0, Expense, "Office rent"),
    ("2025-02-02", "Payroll", "Salaries", 7000.0, Expense, "Team salaries"),
    ("2025-02-05", "Utility Co", "Utilities", 315.25, Expense, "Monthly utilities"),
    ("2025-02-08", "Facebook Ads", "Marketing", 75.0, Expense, "Ad boost"),
    ("2025-02-11", "Restaurant", "Food & Beverage", 65.4, Expense, "Team lunch"),
    ("2025-02-14", "Client B", "Consulting", 950.0, Income, "Project Beta"),
    ("2025-02-16", "Gas Station", "Transportation", 48.3, Expense, "Fuel"),
    ("2025-02-22", "In-Store", "Product Sales", 1200.0, Income, "Product Y"),
    ("2025-02-25", "Amazon", "Office Supplies", 89.99, Expense, "Desk accessories"),
    ("2025-03-01", "Landlord", "Rent", 3000.0, Expense, "Office rent"),
    ("2025-03-02", "Payroll", "Salaries", 7000.0, Expense, "Team salaries"),
    ("2025-03-05", "Utility Co", "Utilities", 305.75, Expense, "Monthly utilities"),
    ("2025-03-10", "Airline", "Travel", 600.0, Expense, "Conference trip"),
    ("2025-03-12", "Marketing Agency", "Marketing", 450.0, Expense, "Campaign"),
    ("2025-03-15", "Client C", "Consulting", 1850.0, Income, "Technical advisory"),
    ("2025-03-18", "Supermarket", "Food & Beverage", 95.2, Expense, "Office snacks"),
    ("2025-03-22", "Taxi", "Transportation", 27.8, Expense, "Airport transfer"),
    ("2025-03-25", "Distributor", "Product Sales", 2100.0, Income, "Product Z"),
    ("2025-04-01", "Landlord", "Rent", 3000.0, Expense, "Office rent"),
    ("2025-04-02", "Payroll", "Salaries", 7000.0, Expense, "Team salaries"),
    ("2025-04-05", "Utility Co", "Utilities", 295.3, Expense, "Monthly utilities"),
    ("2025-04-08", "LinkedIn Ads", "Marketing", 200.0, Expense, "Lead gen"),
    ("2025-04-11", "Catering", "Food & Beverage", 220.0, Expense, "Client event"),
    ("2025-04-14", "Client D", "Consulting", 1400.0, Income, "Strategy session"),
    ("2025-04-17", "Public Transport", "Transportation", 58.4, Expense, "Commute"),
    ("2025-04-22", "Online Store", "Product Sales", 1750.0, Income, "Product X"),
    ("2025-04-25", "Staples", "Office Supplies", 75.5, Expense, "Notebooks"),
    ("2025-05-01", "Landlord", "Rent", 3000.0, Expense, "Office rent"),
    ("2025-05-02", "Payroll", "Salaries", 7000.0, Expense, "Team salaries"),
    ("2025-05-05", "Utility Co", "Utilities", 310.6, Expense, "Monthly utilities"),
    ("2025-05-08", "Google Ads", "Marketing", 350.0, Expense, "Promotion"),
    ("2025-05-12", "Coffee Shop", "Food & Beverage", 42.3, Expense, "Client coffee"),
    ("2025-05-15", "Client E", "Consulting", 1600.0, Income, "Workshop"),
    ("2025-05-18", "Rental Car", "Transportation", 120.0, Expense, "Client meetings"),
    ("2025-05-22", "In-Store", "Product Sales", 1950.0, Income, "Product Y"),
    ("2025-05-25", "Office Depot", "Office Supplies", 110.0, Expense, "Chairs"),
    ("2025-06-01", "Landlord", "Rent", 3000.0, Expense, "Office rent"),
    ("2025-06-02", "Payroll", "Salaries", 7000.0, Expense, "Team salaries"),
    ("2025-06-05", "Utility Co", "Utilities", 302.4, Expense, "Monthly utilities"),
    ("2025-06-10", "Hotel", "Travel", 800.0, Expense, "Industry summit"),
    ("2025-06-12", "Influencer", "Marketing", 500.0, Expense, "Collab"),
    ("2025-06-15", "Restaurant", "Food & Beverage", 87.5, Expense, "Team dinner"),
    ("2025-06-18", "Client F", "Consulting", 2100.0, Income, "System upgrade"),
    ("2025-06-22", "Uber", "Transportation", 45.6, Expense, "Client pickup"),
    ("2025-06-25", "Distributor", "Product Sales", 2250.0, Income, "Product Z"),
    ("2025-07-01", "Landlord", "Rent", 3000.0, Expense, "Office rent"),
    ("2025-07-02", "Payroll", "Salaries", 7000.0, Expense, "Team salaries"),
    ("2025-07-05", "Utility Co", "Utilities", 320.75, Expense, "Monthly utilities"),
    ("2025-07-08", "Staples", "Office Supplies", 135.0, Expense, "Printer paper"),
    ("2025-07-10", "Coffee Shop", "Food & Beverage", 25.0, Expense, "Client meeting"),
    ("2025-07-12", "Client G", "Consulting", 500.0, Income, "Quick consult"),
    ("2025-07-14", "Facebook Ads", "Marketing", 75.0, Expense, "Ad campaign"),
];

pub fn seed_transactions() -> Vec<Transaction> {
    SEED.iter()
        .filter_map(|(date, vendor, category, amount, kind, description)| {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            Some(Transaction::new(date, *vendor, *category, *amount, *kind, *description))
        })
        .collect()
}
