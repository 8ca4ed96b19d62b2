use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vlrgg_scraper::config::Settings;
use vlrgg_scraper::jobs::Scheduler;
use vlrgg_scraper::notify::LogNotifier;
use vlrgg_scraper::ScraperContext;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vlrgg_scraper=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting vlrgg-scraper");

    let settings = Settings::from_env()?;
    let ctx = ScraperContext::new(settings).await?;

    // Clear any semaphore counts a crashed instance may have left behind.
    ctx.limiter.reset().await;

    let scheduler = Scheduler::new(ctx.clone(), Arc::new(LogNotifier));
    let handles = scheduler.start();
    info!(jobs = handles.len(), "scheduler started");

    // Reset again once the jobs are up, in case a first-tick fetch raced a
    // stale count that survived the initial clear.
    ctx.limiter.reset().await;

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    for handle in handles {
        handle.abort();
    }

    info!("shutting down vlrgg-scraper");
    Ok(())
}
