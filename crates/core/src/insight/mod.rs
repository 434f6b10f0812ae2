pub mod client;
pub mod error;
pub mod fallback;
pub mod json;
pub mod request;
pub mod response;
pub mod slot;
pub mod suggest;
pub mod transport;

pub use client::{InsightClient, InsightFailure, InsightOutcome, InsightSource};
pub use error::InsightError;
pub use request::InsightRequest;
pub use slot::{InsightSlot, Ticket};
pub use transport::{HttpInsightTransport, InsightTransport};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const HEALTH_PATH: &str = "/api/health";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    DashboardSummary,
    AnalyticsByType,
    CategoryDetail,
    ChartTrend,
    QuickInsight,
    BudgetSuggestion,
    CategoryOverview,
    MonthSummary,
}

impl Intent {
    pub const ALL: [Intent; 8] = [
        Intent::DashboardSummary,
        Intent::AnalyticsByType,
        Intent::CategoryDetail,
        Intent::ChartTrend,
        Intent::QuickInsight,
        Intent::BudgetSuggestion,
        Intent::CategoryOverview,
        Intent::MonthSummary,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Intent::DashboardSummary => "/api/generate-insights",
            Intent::AnalyticsByType => "/api/generate-analytics-insights",
            Intent::CategoryDetail => "/api/generate-category-insights",
            Intent::ChartTrend => "/api/generate-chart-insights",
            Intent::QuickInsight => "/api/generate-quick-insights",
            Intent::BudgetSuggestion => "/api/generate-budget-suggestions",
            Intent::CategoryOverview => "/api/category-insights",
            Intent::MonthSummary => "/api/generate-month-insights",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::DashboardSummary => "dashboard-summary",
            Intent::AnalyticsByType => "analytics-by-type",
            Intent::CategoryDetail => "category-detail",
            Intent::ChartTrend => "chart-trend",
            Intent::QuickInsight => "quick-insight",
            Intent::BudgetSuggestion => "budget-suggestion",
            Intent::CategoryOverview => "category-overview",
            Intent::MonthSummary => "month-summary",
        }
    }

    /// Whether the remote answer is a JSON document rather than prose.
    pub fn expects_json(&self) -> bool {
        matches!(
            self,
            Intent::DashboardSummary | Intent::AnalyticsByType | Intent::BudgetSuggestion
        )
    }

    /// Whether a failed call should be shown to the user (with a retry
    /// affordance) in addition to the fallback content.
    pub fn surfaces_errors(&self) -> bool {
        matches!(self, Intent::DashboardSummary)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown insight intent: {s}"))
    }
}
