use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tally_core::aggregate::analysis::{self, Recommendation, TransactionInsights};
use tally_core::aggregate::patterns::{self, SpendingPattern};
use tally_core::aggregate::{self as agg, CategoryTotal, MonthlyPoint};
use tally_core::budget::{self, BudgetError, BudgetOverview, BudgetSession};
use tally_core::domain::{Budget, Tab, Transaction, TransactionType};
use tally_core::insight::request::{
    AnalyticsPayload, BudgetSuggestionPayload, CategoryDetailPayload, CategoryOverviewPayload,
    ChartTrendPayload, DashboardPayload, MonthSummaryPayload, QuickInsightPayload,
};
use tally_core::insight::response::BudgetSuggestion;
use tally_core::insight::{InsightClient, InsightOutcome, InsightSlot, Intent};
use tally_core::ledger::{LedgerStore, NewTransaction};
use tally_core::time::{today_local, YearMonth};

const TOP_CATEGORIES: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<LedgerStore>,
    pub budgets: Arc<Mutex<BudgetSession>>,
    pub insights: InsightClient,
    pub quick_insight: Arc<InsightSlot<InsightOutcome<String>>>,
    /// Pinned date for "this month" calculations; local date when unset.
    pub today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(ledger: LedgerStore, budgets: BudgetSession, insights: InsightClient) -> Self {
        Self {
            ledger: Arc::new(ledger),
            budgets: Arc::new(Mutex::new(budgets)),
            insights,
            quick_insight: Arc::new(InsightSlot::new()),
            today: None,
        }
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(today_local)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/analytics/:tab", get(analytics))
        .route(
            "/budgets",
            get(get_budgets).put(replace_budgets).patch(edit_budgets),
        )
        .route("/budgets/overview", get(get_budget_overview))
        .route("/budgets/categories", post(add_category))
        .route("/budgets/categories/:name", delete(remove_category))
        .route("/budgets/suggestions", post(apply_budget_suggestions))
        .route("/spending/patterns", get(spending_patterns))
        .route("/recommendations", get(recommendations))
        .route("/insights/health", get(insight_health))
        .route("/insights/:intent", post(generate_insight))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
            ApiError::Internal(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %format!("{e:#}"), "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<BudgetError> for ApiError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::SaveFailed => ApiError::Internal(anyhow::Error::new(err)),
            BudgetError::DuplicateCategory(_) => ApiError::Conflict(err.to_string()),
            BudgetError::EmptyCategory | BudgetError::InvalidAmount { .. } => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

fn parse_kind(raw: Option<&str>) -> Result<Option<TransactionType>, ApiError> {
    raw.map(|s| s.parse::<TransactionType>())
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Default, Deserialize)]
struct TransactionFilter {
    #[serde(rename = "type")]
    kind: Option<String>,
    category: Option<String>,
}

async fn list_transactions(
    State(state): State<AppState>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let kind = parse_kind(filter.kind.as_deref())?;
    let txs = match (kind, filter.category.as_deref()) {
        (Some(kind), Some(category)) => state.ledger.in_category(category, kind),
        (Some(kind), None) => state.ledger.of_type(kind),
        (None, Some(category)) => state
            .ledger
            .snapshot()
            .into_iter()
            .filter(|t| t.category == category)
            .collect(),
        (None, None) => state.ledger.snapshot(),
    };
    Ok(Json(txs))
}

async fn create_transaction(
    State(state): State<AppState>,
    Json(entry): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let tx = state
        .ledger
        .append(entry, state.today())
        .map_err(|e| ApiError::BadRequest(format!("{e:#}")))?;
    Ok((StatusCode::CREATED, Json(tx)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsView {
    tab: Tab,
    total_amount: f64,
    monthly: Vec<MonthlyPoint>,
    top_categories: Vec<CategoryTotal>,
    current_month_total: f64,
    previous_month_total: f64,
    percentage_change: i64,
}

async fn analytics(
    State(state): State<AppState>,
    Path(tab): Path<String>,
) -> Result<Json<AnalyticsView>, ApiError> {
    let tab: Tab = tab
        .parse()
        .map_err(|_| ApiError::NotFound(format!("unknown analytics tab: {tab}")))?;
    let kind = tab.kind();
    let today = state.today();
    let ledger = state.ledger.snapshot();

    let mut top_categories = agg::category_breakdown(&ledger, kind);
    top_categories.truncate(TOP_CATEGORIES);
    let current = agg::current_month_total(&ledger, kind, today);
    let previous = agg::previous_month_total(&ledger, kind, today);

    Ok(Json(AnalyticsView {
        tab,
        total_amount: agg::type_total(&ledger, kind),
        monthly: agg::monthly_series(&ledger, kind),
        top_categories,
        current_month_total: current,
        previous_month_total: previous,
        percentage_change: agg::percentage_change(current, previous),
    }))
}

/// Builds the next budget mapping from the current one and saves it while
/// holding the session, so concurrent edits do not interleave.
async fn update_budgets<F>(state: &AppState, edit: F) -> Result<Budget, ApiError>
where
    F: FnOnce(&Budget) -> Result<Budget, ApiError>,
{
    let mut session = state.budgets.lock().await;
    let next = edit(session.current())?;
    Ok(session.save(next).await?.clone())
}

async fn get_budgets(State(state): State<AppState>) -> Json<Budget> {
    Json(state.budgets.lock().await.current().clone())
}

async fn replace_budgets(
    State(state): State<AppState>,
    Json(next): Json<Budget>,
) -> Result<Json<Budget>, ApiError> {
    update_budgets(&state, |_| Ok(next)).await.map(Json)
}

/// Raw text edits from the budget form; unparseable entries are skipped.
async fn edit_budgets(
    State(state): State<AppState>,
    Json(edits): Json<BTreeMap<String, String>>,
) -> Result<Json<Budget>, ApiError> {
    update_budgets(&state, |current| Ok(budget::apply_edits(current, &edits)))
        .await
        .map(Json)
}

#[derive(Debug, Deserialize)]
struct NewCategory {
    name: String,
    amount: f64,
}

async fn add_category(
    State(state): State<AppState>,
    Json(req): Json<NewCategory>,
) -> Result<(StatusCode, Json<Budget>), ApiError> {
    let saved = update_budgets(&state, |current| {
        Ok(budget::with_category(current, &req.name, req.amount)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn remove_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Budget>, ApiError> {
    update_budgets(&state, |current| {
        if !current.contains_key(&name) {
            return Err(ApiError::NotFound(format!("no budget for category: {name}")));
        }
        Ok(budget::without_category(current, &name))
    })
    .await
    .map(Json)
}

#[derive(Debug, Deserialize)]
struct ApplySuggestions {
    suggestions: Vec<BudgetSuggestion>,
}

async fn apply_budget_suggestions(
    State(state): State<AppState>,
    Json(req): Json<ApplySuggestions>,
) -> Result<Json<Budget>, ApiError> {
    let suggestions = req
        .suggestions
        .into_iter()
        .map(BudgetSuggestion::validate)
        .collect::<anyhow::Result<Vec<_>>>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    update_budgets(&state, |current| {
        Ok(budget::apply_suggestions(
            current,
            suggestions
                .iter()
                .map(|s| (s.category.as_str(), s.suggested_budget)),
        ))
    })
    .await
    .map(Json)
}

#[derive(Debug, Default, Deserialize)]
struct MonthQuery {
    month: Option<YearMonth>,
}

async fn get_budget_overview(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Json<BudgetOverview> {
    let month = query.month.unwrap_or_else(|| YearMonth::of(state.today()));
    let spent = agg::monthly_category_spend(&state.ledger.snapshot(), month);
    let budgets = state.budgets.lock().await.current().clone();
    Json(budget::budget_overview(&budgets, &spent))
}

async fn spending_patterns(State(state): State<AppState>) -> Json<Vec<SpendingPattern>> {
    Json(patterns::spending_patterns(
        &state.ledger.snapshot(),
        state.today(),
    ))
}

#[derive(Debug, Serialize)]
struct RecommendationsView {
    insights: TransactionInsights,
    recommendations: Vec<Recommendation>,
}

async fn recommendations(State(state): State<AppState>) -> Json<RecommendationsView> {
    let ledger = state.ledger.snapshot();
    let insights = analysis::analyze_transactions(&ledger);
    let recommendations = analysis::recommendations(&insights, &ledger);
    Json(RecommendationsView {
        insights,
        recommendations,
    })
}

async fn insight_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "healthy": state.insights.health().await }))
}

/// Selection context for an insight request. Every field is optional; each
/// intent reads the ones it needs.
#[derive(Debug, Default, Deserialize)]
struct InsightQuery {
    tab: Option<Tab>,
    category: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    month: Option<YearMonth>,
}

impl InsightQuery {
    fn tab(&self) -> Tab {
        self.tab.unwrap_or(Tab::Expenses)
    }

    /// An absent or blank body selects the defaults; anything else must
    /// decode, so a malformed field never silently picks another tab.
    fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let query: Self = serde_json::from_slice(body)
            .map_err(|e| ApiError::BadRequest(format!("invalid insight selection: {e}")))?;
        query.kind()?;
        Ok(query)
    }

    fn kind(&self) -> Result<TransactionType, ApiError> {
        Ok(parse_kind(self.kind.as_deref())?.unwrap_or(TransactionType::Expense))
    }
}

async fn generate_insight(
    State(state): State<AppState>,
    Path(intent): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let intent: Intent = intent
        .parse()
        .map_err(|_| ApiError::NotFound(format!("unknown insight intent: {intent}")))?;
    let query = InsightQuery::from_body(&body)?;
    let ledger = state.ledger.snapshot();
    let today = state.today();
    let insights = &state.insights;

    let response = match intent {
        Intent::DashboardSummary => {
            Json(insights.generate(&DashboardPayload::build(&ledger)).await).into_response()
        }
        Intent::AnalyticsByType => {
            let payload = AnalyticsPayload::build(&ledger, query.tab(), today);
            Json(insights.generate(&payload).await).into_response()
        }
        Intent::CategoryDetail => {
            let category = query
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| ApiError::BadRequest("category is required".to_string()))?;
            let payload = CategoryDetailPayload::build(&ledger, category, query.kind()?);
            Json(insights.generate(&payload).await).into_response()
        }
        Intent::ChartTrend => match ChartTrendPayload::from_ledger(&ledger, query.tab()) {
            Some(payload) => Json(insights.generate(&payload).await).into_response(),
            None => StatusCode::NO_CONTENT.into_response(),
        },
        Intent::QuickInsight => quick_insight(&state, &ledger, query.tab(), today).await,
        Intent::BudgetSuggestion => {
            let budgets = state.budgets.lock().await.current().clone();
            let payload = BudgetSuggestionPayload::build(&ledger, &budgets);
            Json(insights.generate(&payload).await).into_response()
        }
        Intent::CategoryOverview => {
            let payload = CategoryOverviewPayload::build(&ledger, query.kind()?);
            Json(insights.generate(&payload).await).into_response()
        }
        Intent::MonthSummary => {
            let budgets = state.budgets.lock().await.current().clone();
            let month = query.month.unwrap_or_else(|| YearMonth::of(today));
            let payload = MonthSummaryPayload::build(&ledger, &budgets, month);
            Json(insights.generate(&payload).await).into_response()
        }
    };
    Ok(response)
}

/// Fires once per tab selection; repeated requests for the same tab get the
/// stored outcome, and a pending first request answers 202.
async fn quick_insight(
    state: &AppState,
    ledger: &[Transaction],
    tab: Tab,
    today: NaiveDate,
) -> Response {
    let slot = &state.quick_insight;
    let Some(ticket) = slot.begin_once(tab.as_str()) else {
        return match slot.current() {
            Some(outcome) => Json(outcome).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        };
    };

    let outcome = state
        .insights
        .generate(&QuickInsightPayload::build(ledger, tab, today))
        .await;
    slot.apply(ticket, outcome.clone());
    Json(outcome).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tally_core::budget::{BudgetStore, InMemoryBudgetStore};
    use tally_core::insight::InsightTransport;
    use tower::ServiceExt;
    use uuid::Uuid;

    struct StubTransport {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InsightTransport for StubTransport {
        async fn post(&self, _path: &str, _request_id: Uuid, _body: &Value) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or_else(|| anyhow::anyhow!("connection refused"))
        }

        async fn health(&self) -> anyhow::Result<()> {
            self.reply.as_ref().map(|_| ()).ok_or_else(|| anyhow::anyhow!("down"))
        }
    }

    struct FailingStore;

    #[async_trait]
    impl BudgetStore for FailingStore {
        async fn read(&self) -> anyhow::Result<Option<Budget>> {
            Ok(None)
        }

        async fn write(&self, _budget: &Budget) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    async fn state_with(
        reply: Option<&str>,
        ledger: LedgerStore,
        store: Arc<dyn BudgetStore>,
    ) -> (AppState, Arc<StubTransport>) {
        let transport = Arc::new(StubTransport {
            reply: reply.map(str::to_string),
            calls: AtomicUsize::new(0),
        });
        let mut state = AppState::new(
            ledger,
            BudgetSession::open(store).await,
            InsightClient::new(transport.clone()),
        );
        state.today = NaiveDate::from_ymd_opt(2025, 7, 20);
        (state, transport)
    }

    async fn offline_state() -> AppState {
        state_with(None, LedgerStore::seeded(), Arc::new(InMemoryBudgetStore::new()))
            .await
            .0
    }

    async fn send(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let req = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let res = router(state.clone()).oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    #[tokio::test]
    async fn healthz_ok() {
        let state = offline_state().await;
        let (status, body) = send(&state, Method::GET, "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn smart_add_categorizes_and_normalizes_sign() {
        let state = offline_state().await;
        let (status, body) = send(
            &state,
            Method::POST,
            "/transactions",
            Some(json!({"vendor": "Uber", "description": "Ride to client", "amount": 25})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["category"], "Transportation");
        assert_eq!(body["type"], "Expense");
        assert_eq!(body["amount"], -25.0);
        assert_eq!(body["date"], "2025-07-20");

        let (_, list) = send(&state, Method::GET, "/transactions?type=expense", None).await;
        assert_eq!(list.as_array().unwrap().len(), 50);
    }

    #[tokio::test]
    async fn invalid_transactions_are_rejected() {
        let state = offline_state().await;
        let (status, _) = send(
            &state,
            Method::POST,
            "/transactions",
            Some(json!({"vendor": " ", "description": "x", "amount": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, Method::GET, "/transactions?type=refund", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.ledger.len(), 62);
    }

    #[tokio::test]
    async fn analytics_by_tab() {
        let state = offline_state().await;
        let (status, body) = send(&state, Method::GET, "/analytics/income", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalAmount"], 19700.0);
        assert_eq!(body["currentMonthTotal"], 500.0);
        assert_eq!(body["percentageChange"], -89);
        assert_eq!(body["monthly"].as_array().unwrap().len(), 7);
        assert_eq!(body["topCategories"][0]["name"], "Product Sales");

        let (status, _) = send(&state, Method::GET, "/analytics/refunds", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn budget_category_lifecycle() {
        let state = offline_state().await;
        let (status, body) = send(
            &state,
            Method::POST,
            "/budgets/categories",
            Some(json!({"name": "Legal", "amount": 250})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["Legal"], 250.0);

        let (status, _) = send(
            &state,
            Method::POST,
            "/budgets/categories",
            Some(json!({"name": "Legal", "amount": 300})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(
            &state,
            Method::PATCH,
            "/budgets",
            Some(json!({"Legal": "275", "Rent": "lots"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Legal"], 275.0);
        assert_eq!(body["Rent"], 3000.0);

        let (status, body) = send(&state, Method::DELETE, "/budgets/categories/Legal", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("Legal").is_none());

        let (status, _) = send(&state, Method::DELETE, "/budgets/categories/Legal", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn replace_with_empty_budget_is_kept() {
        let state = offline_state().await;
        let (status, body) = send(&state, Method::PUT, "/budgets", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));
        let (_, body) = send(&state, Method::GET, "/budgets", None).await;
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn failed_save_returns_500_and_keeps_budgets() {
        let (state, _) = state_with(None, LedgerStore::seeded(), Arc::new(FailingStore)).await;
        let (status, body) = send(&state, Method::PUT, "/budgets", Some(json!({"Rent": 1}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("failed to save budgets"));

        let (_, body) = send(&state, Method::GET, "/budgets", None).await;
        assert_eq!(body["Rent"], 3000.0);
    }

    #[tokio::test]
    async fn negative_ceiling_is_a_bad_request() {
        let state = offline_state().await;
        let (status, body) =
            send(&state, Method::PUT, "/budgets", Some(json!({"Rent": -100, "Travel": 900}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Rent"));

        let (_, body) = send(&state, Method::GET, "/budgets", None).await;
        assert_eq!(body["Rent"], 3000.0);
        assert_eq!(body["Travel"], 1000.0);
    }

    #[tokio::test]
    async fn applying_suggestions_overwrites_ceilings() {
        let state = offline_state().await;
        let (status, body) = send(
            &state,
            Method::POST,
            "/budgets/suggestions",
            Some(json!({"suggestions": [{"category": "Marketing", "currentBudget": 500, "suggestedBudget": 660}]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Marketing"], 660.0);

        let (status, _) = send(
            &state,
            Method::POST,
            "/budgets/suggestions",
            Some(json!({"suggestions": [{"category": "Marketing", "suggestedBudget": -1}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn overview_flags_rent_over_budget() {
        let ledger = LedgerStore::new(vec![Transaction::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            "Landlord",
            "Rent",
            3300.0,
            TransactionType::Expense,
            "Office rent",
        )]);
        let (state, _) = state_with(None, ledger, Arc::new(InMemoryBudgetStore::new())).await;
        let (status, body) = send(&state, Method::GET, "/budgets/overview?month=2025-07", None).await;
        assert_eq!(status, StatusCode::OK);
        let rent = body["lines"]
            .as_array()
            .unwrap()
            .iter()
            .find(|l| l["category"] == "Rent")
            .unwrap()
            .clone();
        assert_eq!(rent["utilization"], 110.0);
        assert_eq!(rent["status"], "Over Budget");
    }

    #[tokio::test]
    async fn local_panels_render_without_the_insight_service() {
        let state = offline_state().await;
        let (status, body) = send(&state, Method::GET, "/spending/patterns", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().iter().any(|p| p["category"] == "Rent"));

        let (status, body) = send(&state, Method::GET, "/recommendations", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["insights"]["totalIncome"], 19700.0);
        assert!(body["recommendations"].is_array());
    }

    #[tokio::test]
    async fn dashboard_fallback_carries_a_visible_error() {
        let state = offline_state().await;
        let (status, body) = send(&state, Method::POST, "/insights/dashboard-summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "fallback");
        assert!(body["error"].is_string());
        assert!(!body["insight"]["brief"].as_str().unwrap().is_empty());

        let (_, body) = send(
            &state,
            Method::POST,
            "/insights/analytics-by-type",
            Some(json!({"tab": "income"})),
        )
        .await;
        assert_eq!(body["source"], "fallback");
        assert!(body.get("error").is_none());
        assert_eq!(body["insight"]["summary"], "Revenue analysis complete. Total: $19,700");
    }

    #[tokio::test]
    async fn remote_text_insight_is_passed_through() {
        let (state, _) = state_with(
            Some(r#"{"insight": "Marketing spend is uneven month to month."}"#),
            LedgerStore::seeded(),
            Arc::new(InMemoryBudgetStore::new()),
        )
        .await;
        let (status, body) = send(
            &state,
            Method::POST,
            "/insights/category-detail",
            Some(json!({"category": "Marketing", "type": "Expense"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "remote");
        assert_eq!(body["insight"], "Marketing spend is uneven month to month.");
        assert!(Uuid::parse_str(body["requestId"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn insight_request_validation() {
        let state = offline_state().await;
        let (status, _) = send(&state, Method::POST, "/insights/horoscope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&state, Method::POST, "/insights/category-detail", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&state, Method::GET, "/insights/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], false);
    }

    #[tokio::test]
    async fn malformed_insight_selection_is_rejected() {
        let (state, transport) = state_with(
            None,
            LedgerStore::seeded(),
            Arc::new(InMemoryBudgetStore::new()),
        )
        .await;
        for (intent, body) in [
            ("analytics-by-type", json!({"tab": "refunds"})),
            ("category-overview", json!({"type": "Income", "tab": 5})),
            ("category-overview", json!({"type": "Refund"})),
            ("month-summary", json!({"month": "2025-13"})),
        ] {
            let (status, err) =
                send(&state, Method::POST, &format!("/insights/{intent}"), Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{intent}");
            assert!(err["error"].is_string());
        }

        let req = Request::builder()
            .method(Method::POST)
            .uri("/insights/analytics-by-type")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"tab\":"))
            .unwrap();
        let res = router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn explicit_insight_selection_is_honored() {
        let state = offline_state().await;
        let (status, body) = send(
            &state,
            Method::POST,
            "/insights/category-overview",
            Some(json!({"type": "Income"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["insight"].as_str().unwrap().contains("$19,700"));

        let (status, body) = send(
            &state,
            Method::POST,
            "/insights/analytics-by-type",
            Some(json!({"tab": "income"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["insight"]["summary"], "Revenue analysis complete. Total: $19,700");
    }

    #[tokio::test]
    async fn chart_trend_on_empty_ledger_sends_nothing() {
        let (state, transport) = state_with(
            Some("unused"),
            LedgerStore::default(),
            Arc::new(InMemoryBudgetStore::new()),
        )
        .await;
        let (status, _) = send(&state, Method::POST, "/insights/chart-trend", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn quick_insight_fires_once_per_tab() {
        let (state, transport) = state_with(
            None,
            LedgerStore::seeded(),
            Arc::new(InMemoryBudgetStore::new()),
        )
        .await;
        let income = Some(json!({"tab": "income"}));

        let (_, first) = send(&state, Method::POST, "/insights/quick-insight", income.clone()).await;
        let (_, second) = send(&state, Method::POST, "/insights/quick-insight", income.clone()).await;
        assert_eq!(first, second);
        assert_eq!(first["source"], "fallback");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        send(&state, Method::POST, "/insights/quick-insight", Some(json!({"tab": "expenses"}))).await;
        send(&state, Method::POST, "/insights/quick-insight", income).await;
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn month_summary_uses_saved_budgets() {
        let state = offline_state().await;
        send(&state, Method::PUT, "/budgets", Some(json!({"Rent": 2000}))).await;
        let (status, body) = send(
            &state,
            Method::POST,
            "/insights/month-summary",
            Some(json!({"month": "2025-07"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let text = body["insight"].as_str().unwrap();
        assert!(text.starts_with("2025-07: income $500"));
        assert!(text.ends_with("Over budget: Rent."));
    }

    #[tokio::test]
    async fn budget_suggestions_fall_back_to_local_rules() {
        let state = offline_state().await;
        let (status, body) = send(&state, Method::POST, "/insights/budget-suggestion", None).await;
        assert_eq!(status, StatusCode::OK);
        let office = body["insight"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["category"] == "Office Supplies")
            .unwrap()
            .clone();
        assert_eq!(office["currentBudget"], 200.0);
        assert_eq!(office["suggestedBudget"], 121.0);
    }
}
