use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webcheck_db::SqliteStore;
use webcheck_events::EmailDelivery;
use webcheck_worker::run::{run_pass, DeliveryOutcome, RunContext, RunReport};
use webcheck_worker::scheduler::run_periodically;
use webcheck_worker::{config, HttpFetcher, MonitorConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webcheck_worker=info,webcheck_db=info,webcheck_events=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // --- Configuration ---
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("WEBCHECK_CONFIG").ok())
        .map(PathBuf::from)
        .context("usage: webcheck-worker <config.json> (or set WEBCHECK_CONFIG)")?;
    let config = config::load(&config_path)?;
    tracing::info!(
        path = %config_path.display(),
        urls = config.urls.len(),
        "Loaded monitor configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| config::default_database_url(&config_path));
    let pool = webcheck_db::create_pool(&database_url)
        .await
        .with_context(|| format!("Failed to open database {database_url}"))?;
    webcheck_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    webcheck_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(%database_url, "Database ready");

    // --- Collaborators ---
    let store = SqliteStore::new(pool);
    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
    let mailer = EmailDelivery::new(config.mail_relay());

    let interval = std::env::var("WEBCHECK_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    let Some(interval) = interval else {
        let report = single_pass(&config, &store, &fetcher, &mailer).await;
        log_report(&report);
        return Ok(());
    };

    // --- Periodic mode ---
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    let (config, store, fetcher, mailer) = (&config, &store, &fetcher, &mailer);
    run_periodically(interval, cancel, move || async move {
        let report = single_pass(config, store, fetcher, mailer).await;
        log_report(&report);
    })
    .await;
    Ok(())
}

async fn single_pass(
    config: &MonitorConfig,
    store: &SqliteStore,
    fetcher: &HttpFetcher,
    mailer: &EmailDelivery,
) -> RunReport {
    let ctx = RunContext {
        now: chrono::Utc::now(),
        config,
        store,
        fetcher,
        mailer,
    };
    run_pass(&ctx).await
}

fn log_report(report: &RunReport) {
    let delivery = match &report.delivery {
        DeliveryOutcome::NothingToSend => "nothing to send",
        DeliveryOutcome::Sent => "sent",
        DeliveryOutcome::NoRecipients => "no recipients",
        DeliveryOutcome::Failed(_) => "failed",
    };
    tracing::info!(
        urls_checked = report.urls_checked,
        urls_abandoned = report.urls_abandoned,
        baselines_created = report.baselines_created,
        alerts = report.batch.len(),
        alerts_suppressed = report.alerts_suppressed,
        delivery,
        "Run finished"
    );
}
