use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_core::budget::{BudgetSession, InMemoryBudgetStore};
use tally_core::insight::InsightClient;
use tally_core::ledger::LedgerStore;

mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = tally_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let insights = InsightClient::from_settings(&settings)?;
    if !insights.health().await {
        tracing::warn!(
            base_url = settings.insight_base_url(),
            "insight service unreachable; insights will use local fallbacks"
        );
    }

    let ledger = LedgerStore::seeded();
    let budgets = BudgetSession::open(Arc::new(InMemoryBudgetStore::new())).await;
    tracing::info!(transactions = ledger.len(), categories = budgets.current().len(), "state loaded");

    let app = routes::router(routes::AppState::new(ledger, budgets, insights));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &tally_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
