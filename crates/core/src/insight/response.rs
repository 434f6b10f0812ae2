use crate::insight::fallback;
use crate::insight::json::{self, decode};
use crate::insight::request::{
    AnalyticsPayload, BudgetSuggestionPayload, CategoryDetailPayload, CategoryOverviewPayload,
    ChartTrendPayload, DashboardPayload, InsightRequest, MonthSummaryPayload, QuickInsightPayload,
};
use crate::insight::Intent;
use anyhow::{anyhow, bail, ensure};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ENVELOPE: &str = "insight";
const SUGGESTIONS_ENVELOPE: &str = "suggestions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardInsight {
    pub brief: String,
    pub detailed: DashboardDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardDetail {
    pub overview: String,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub monitoring: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsInsight {
    pub summary: String,
    #[serde(default)]
    pub analysis: AnalyticsDetail,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub predictions: Predictions,
    #[serde(default)]
    pub alerts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsDetail {
    pub trends: String,
    pub top_categories: String,
    pub patterns: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Predictions {
    pub next_month: String,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSuggestion {
    pub category: String,
    #[serde(default)]
    pub current_budget: f64,
    pub suggested_budget: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub avg_spending: f64,
}

impl DashboardInsight {
    pub fn validate(self) -> anyhow::Result<Self> {
        ensure!(!self.brief.trim().is_empty(), "dashboard insight has an empty brief");
        Ok(self)
    }
}

impl AnalyticsInsight {
    pub fn validate(self) -> anyhow::Result<Self> {
        ensure!(!self.summary.trim().is_empty(), "analytics insight has an empty summary");
        Ok(self)
    }
}

impl BudgetSuggestion {
    pub fn validate(self) -> anyhow::Result<Self> {
        ensure!(!self.category.trim().is_empty(), "budget suggestion without a category");
        if !self.suggested_budget.is_finite() || self.suggested_budget < 0.0 {
            bail!(
                "budget suggestion for {} has an invalid amount: {}",
                self.category,
                self.suggested_budget
            );
        }
        Ok(self)
    }
}

/// Accepts a bare array, `{ "suggestions": [...] }`, or the generic
/// `insight` envelope around either.
pub fn parse_suggestions(body: &str) -> anyhow::Result<Vec<BudgetSuggestion>> {
    let doc = json::parse_document(body).ok_or_else(|| anyhow!("response contains no JSON document"))?;
    let doc = json::unwrap_envelope(doc, ENVELOPE)?;
    let doc = json::unwrap_envelope(doc, SUGGESTIONS_ENVELOPE)?;
    let items: Vec<BudgetSuggestion> = match doc {
        Value::Array(_) => serde_json::from_value(doc)?,
        other => bail!("expected an array of budget suggestions, got {}", kind_of(&other)),
    };
    items.into_iter().map(BudgetSuggestion::validate).collect()
}

/// Free-text intents: `{ "insight": "..." }` or the raw body itself.
pub fn parse_text(body: &str) -> anyhow::Result<String> {
    let text = match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::Object(mut map)) => match map.remove(ENVELOPE) {
            Some(Value::String(s)) => s,
            Some(other) => bail!("`insight` is {}, expected text", kind_of(&other)),
            None => bail!("response object has no `insight` field"),
        },
        Ok(Value::String(s)) => s,
        _ => body.to_string(),
    };
    let text = text.trim();
    ensure!(!text.is_empty(), "response text is empty");
    Ok(text.to_string())
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl InsightRequest for DashboardPayload {
    const INTENT: Intent = Intent::DashboardSummary;
    type Output = DashboardInsight;

    fn normalize(&self, body: &str) -> anyhow::Result<DashboardInsight> {
        decode::<DashboardInsight>(body, ENVELOPE)?.validate()
    }

    fn fallback(&self) -> DashboardInsight {
        fallback::dashboard(self)
    }
}

impl InsightRequest for AnalyticsPayload {
    const INTENT: Intent = Intent::AnalyticsByType;
    type Output = AnalyticsInsight;

    fn normalize(&self, body: &str) -> anyhow::Result<AnalyticsInsight> {
        decode::<AnalyticsInsight>(body, ENVELOPE)?.validate()
    }

    fn fallback(&self) -> AnalyticsInsight {
        fallback::analytics(self)
    }
}

impl InsightRequest for BudgetSuggestionPayload {
    const INTENT: Intent = Intent::BudgetSuggestion;
    type Output = Vec<BudgetSuggestion>;

    /// Local figures win over whatever the model echoed back for the current
    /// budget and average spend.
    fn normalize(&self, body: &str) -> anyhow::Result<Vec<BudgetSuggestion>> {
        let mut suggestions = parse_suggestions(body)?;
        for s in &mut suggestions {
            if let Some(budget) = self.current_budgets.get(&s.category) {
                s.current_budget = *budget;
            }
            if let Some(avg) = self.category_averages.get(&s.category) {
                s.avg_spending = *avg;
            }
        }
        Ok(suggestions)
    }

    fn fallback(&self) -> Vec<BudgetSuggestion> {
        fallback::budget_suggestions(self)
    }
}

impl InsightRequest for CategoryDetailPayload {
    const INTENT: Intent = Intent::CategoryDetail;
    type Output = String;

    fn normalize(&self, body: &str) -> anyhow::Result<String> {
        parse_text(body)
    }

    fn fallback(&self) -> String {
        fallback::category_detail(self)
    }
}

impl InsightRequest for ChartTrendPayload {
    const INTENT: Intent = Intent::ChartTrend;
    type Output = String;

    fn normalize(&self, body: &str) -> anyhow::Result<String> {
        parse_text(body)
    }

    fn fallback(&self) -> String {
        fallback::chart_trend(self)
    }
}

impl InsightRequest for QuickInsightPayload {
    const INTENT: Intent = Intent::QuickInsight;
    type Output = String;

    fn normalize(&self, body: &str) -> anyhow::Result<String> {
        let text: String = parse_text(body)?
            .chars()
            .filter(|c| *c != '"' && *c != '\'')
            .collect();
        let text = text.trim();
        ensure!(!text.is_empty(), "quick insight is only quote characters");
        Ok(text.to_string())
    }

    fn fallback(&self) -> String {
        fallback::quick_insight(self)
    }
}

impl InsightRequest for CategoryOverviewPayload {
    const INTENT: Intent = Intent::CategoryOverview;
    type Output = String;

    fn normalize(&self, body: &str) -> anyhow::Result<String> {
        parse_text(body)
    }

    fn fallback(&self) -> String {
        fallback::category_overview(self)
    }
}

impl InsightRequest for MonthSummaryPayload {
    const INTENT: Intent = Intent::MonthSummary;
    type Output = String;

    fn normalize(&self, body: &str) -> anyhow::Result<String> {
        parse_text(body)
    }

    fn fallback(&self) -> String {
        fallback::month_summary(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{default_budgets, Tab};
    use crate::ledger::seed_transactions;
    use serde_json::json;

    #[test]
    fn dashboard_reads_enveloped_and_bare_documents() {
        let payload = DashboardPayload::build(&seed_transactions());
        let doc = json!({
            "brief": "Expenses outpace income.",
            "detailed": {"overview": "o", "keyInsights": ["k"], "recommendations": [], "monitoring": ["m"]}
        });
        let enveloped = json!({"insight": doc.clone(), "metadata": {"transactionCount": 62}}).to_string();

        let a = payload.normalize(&enveloped).unwrap();
        let b = payload.normalize(&doc.to_string()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.detailed.key_insights, vec!["k"]);
    }

    #[test]
    fn dashboard_detail_fields_default_when_missing() {
        let payload = DashboardPayload::build(&[]);
        let got = payload
            .normalize(r#"Here it is: {"brief": "ok", "detailed": {"overview": "x"}}"#)
            .unwrap();
        assert!(got.detailed.monitoring.is_empty());
    }

    #[test]
    fn dashboard_rejects_empty_brief_and_wrong_shape() {
        let payload = DashboardPayload::build(&[]);
        assert!(payload.normalize(r#"{"brief": "  ", "detailed": {}}"#).is_err());
        assert!(payload.normalize(r#"{"summary": "wrong intent"}"#).is_err());
        assert!(payload.normalize("I think your finances look fine.").is_err());
    }

    #[test]
    fn analytics_optional_sections_default() {
        let payload = AnalyticsPayload::build(&seed_transactions(), Tab::Expenses, crate::time::today_local());
        let got = payload.normalize(r#"{"summary": "Rent dominates."}"#).unwrap();
        assert!(got.alerts.is_empty());
        assert!(got.recommendations.is_empty());
        assert_eq!(got.predictions, Predictions::default());
    }

    #[test]
    fn suggestions_accept_array_or_envelope() {
        let arr = json!([{"category": "Marketing", "currentBudget": 500, "suggestedBudget": 650, "reasoning": "r"}]);
        let a = parse_suggestions(&arr.to_string()).unwrap();
        let b = parse_suggestions(&json!({"suggestions": arr}).to_string()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].suggested_budget, 650.0);
    }

    #[test]
    fn invalid_suggestions_fail_the_whole_answer() {
        assert!(parse_suggestions(r#"[{"category": "", "suggestedBudget": 10}]"#).is_err());
        assert!(parse_suggestions(r#"[{"category": "Rent", "suggestedBudget": -5}]"#).is_err());
        assert!(parse_suggestions(r#"{"suggestions": "none"}"#).is_err());
        assert!(parse_suggestions("[]").unwrap().is_empty());
    }

    #[test]
    fn local_figures_override_echoed_ones() {
        let payload = BudgetSuggestionPayload::build(&seed_transactions(), &default_budgets());
        let body = json!({"suggestions": [
            {"category": "Marketing", "currentBudget": 1, "suggestedBudget": 420, "avgSpending": 2}
        ]});
        let got = payload.normalize(&body.to_string()).unwrap();
        assert_eq!(got[0].current_budget, 500.0);
        assert!((got[0].avg_spending - 1800.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn text_intents_accept_envelope_or_raw() {
        assert_eq!(parse_text(r#"{"insight": " Spending is steady. "}"#).unwrap(), "Spending is steady.");
        assert_eq!(parse_text("Spending is steady.\n").unwrap(), "Spending is steady.");
        assert!(parse_text(r#"{"insight": ""}"#).is_err());
        assert!(parse_text(r#"{"error": "quota"}"#).is_err());
        assert!(parse_text("   ").is_err());
    }

    #[test]
    fn quick_insight_strips_quotes() {
        let payload = QuickInsightPayload::build(&[], Tab::Income, crate::time::today_local());
        let got = payload
            .normalize(r#"{"insight": "\"Income is up, don't stop now!\""}"#)
            .unwrap();
        assert_eq!(got, "Income is up, dont stop now!");
        assert!(payload.normalize(r#"{"insight": "\"\""}"#).is_err());
    }
}
