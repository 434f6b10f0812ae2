use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_core::budget::{BudgetSession, InMemoryBudgetStore};
use tally_core::domain::Tab;
use tally_core::insight::request::{BudgetSuggestionPayload, DashboardPayload, QuickInsightPayload};
use tally_core::insight::{HttpInsightTransport, InsightClient};
use tally_core::ledger::{categorize, seed_transactions};

mod report;

#[derive(Debug, Parser)]
#[command(name = "tally_cli")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print analytics, budget status and local recommendations for the
    /// sample ledger as JSON.
    Report {
        /// `income` or `expenses`.
        #[arg(long, default_value = "expenses")]
        tab: String,

        /// Reference date (YYYY-MM-DD). Defaults to the local date.
        #[arg(long)]
        today: Option<String>,

        /// Also request remote insights from INSIGHT_BASE_URL (falls back
        /// locally when the service is down).
        #[arg(long)]
        insights: bool,
    },
    /// Guess category and type for a new entry.
    Categorize {
        #[arg(long)]
        vendor: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = tally_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(args, &settings).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %format!("{err:#}"), "command failed");
        return Err(err);
    }
    Ok(())
}

async fn run(args: Args, settings: &tally_core::config::Settings) -> anyhow::Result<()> {
    match args.command {
        Command::Report {
            tab,
            today,
            insights,
        } => {
            let tab: Tab = tab.parse()?;
            let today = resolve_today(today.as_deref())?;
            let ledger = seed_transactions();
            let session = BudgetSession::open(Arc::new(InMemoryBudgetStore::new())).await;

            let report = report::build_report(&ledger, session.current(), tab, today);
            let mut out = serde_json::to_value(&report)?;

            if insights {
                let client = insight_client(settings)?;
                let dashboard = client.generate(&DashboardPayload::build(&ledger)).await;
                let quick = client
                    .generate(&QuickInsightPayload::build(&ledger, tab, today))
                    .await;
                let suggestions = client
                    .generate(&BudgetSuggestionPayload::build(&ledger, session.current()))
                    .await;
                if let Some(err) = dashboard.visible_error() {
                    tracing::warn!(request_id = %dashboard.request_id, "{err}");
                }
                out["insights"] = serde_json::json!({
                    "dashboard": dashboard,
                    "quick": quick,
                    "budgetSuggestions": suggestions,
                });
            }

            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Categorize {
            vendor,
            description,
            amount,
        } => {
            let guess = categorize(&vendor, &description, amount);
            tracing::info!(%vendor, category = %guess.category, kind = %guess.kind, "categorized");
            println!("{}", serde_json::to_string_pretty(&guess)?);
        }
    }

    Ok(())
}

/// One-off runs talk to a configured service only; there is no local
/// default like the API server has.
fn insight_client(settings: &tally_core::config::Settings) -> anyhow::Result<InsightClient> {
    let base_url = settings.require_insight_base_url()?;
    let transport = HttpInsightTransport::new(
        base_url,
        Duration::from_secs(settings.insight_timeout_secs),
    )?;
    Ok(InsightClient::new(Arc::new(transport)))
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

fn resolve_today(arg: Option<&str>) -> anyhow::Result<chrono::NaiveDate> {
    match arg {
        Some(s) => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --today date: {s}")),
        None => Ok(tally_core::time::today_local()),
    }
}
