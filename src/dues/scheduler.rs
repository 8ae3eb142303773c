use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::time::{self, Duration as TokioDuration};
use tracing::{debug, warn};

use crate::config;
use crate::members::PgMemberDirectory;

use super::generator::DueGenerator;
use super::models::BillingPeriod;
use super::reconciliation::OverdueSweeper;
use super::reference::PixConfig;
use super::repository::PgDueRepository;

/// key: dues-scheduler -> periodic sweep plus optional generation
pub fn spawn(pool: PgPool) {
    let interval = TokioDuration::from_secs(*config::DUES_SWEEP_INTERVAL_SECS);
    let auto_generate = *config::DUES_AUTO_GENERATE;
    let fee = *config::DUES_MEMBERSHIP_FEE;

    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        loop {
            ticker.tick().await;
            let now = Utc::now();
            if let Err(err) = process_tick(&pool, now, auto_generate, fee).await {
                warn!(?err, "dues maintenance tick failed");
            }
        }
    });
}

/// key: dues-scheduler -> tick handler
///
/// Runs the overdue sweep against `now`, and when enabled the idempotent
/// generation for the current period. Both operations stay independently
/// callable; this is only their periodic caller.
pub async fn process_tick(
    pool: &PgPool,
    now: DateTime<Utc>,
    auto_generate: bool,
    fee: Decimal,
) -> Result<()> {
    let repo = Arc::new(PgDueRepository::new(pool.clone()));

    let sweeper = OverdueSweeper::new(repo.clone());
    let transitioned = sweeper.sweep(now.date_naive()).await?;
    debug!(transitioned, "overdue sweep tick complete");

    if auto_generate {
        let period = BillingPeriod::new(now.month(), now.year())?;
        let directory = Arc::new(PgMemberDirectory::new(pool.clone()));
        let generator = DueGenerator::new(repo, directory, fee, PixConfig::from_env());
        let outcome = generator.generate(period, None).await?;
        if !outcome.failures.is_empty() {
            warn!(
                %period,
                failed = outcome.failures.len(),
                "current-period generation finished with failures"
            );
        }
    }

    Ok(())
}
