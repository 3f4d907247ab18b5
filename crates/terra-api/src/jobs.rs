//! Background jobs for periodic maintenance tasks.
//!
//! The mission-progress endpoint never writes leaderboard rows, so the
//! snapshot tables go stale between completions by design. The job here is
//! what brings them back up to date.

use sqlx::PgPool;
use std::time::Duration;
use tokio::time::interval;

use crate::leaderboard::aggregator;

/// Start all background jobs
///
/// Returns a vector of join handles that can be awaited on shutdown
pub fn start_background_jobs(pool: PgPool) -> Vec<tokio::task::JoinHandle<()>> {
    vec![tokio::spawn(periodic_leaderboard_refresh_job(pool))]
}

/// Recompute the weekly and monthly leaderboard snapshots every 15 minutes
///
/// Each pass upserts snapshot rows for every user active in the current
/// periods and rewrites the ranks, so staleness is bounded by the interval.
async fn periodic_leaderboard_refresh_job(pool: PgPool) {
    // Wait a minute before the first run to avoid startup contention
    tokio::time::sleep(Duration::from_secs(60)).await;

    let mut interval = interval(Duration::from_secs(900)); // 15 minutes

    loop {
        interval.tick().await;

        match aggregator::refresh_current_periods(&pool).await {
            Ok(refreshed) if refreshed > 0 => {
                tracing::info!("Leaderboard refresh complete: {} snapshot rows", refreshed);
            }
            Ok(_) => {
                tracing::debug!("Leaderboard refresh complete: no active users this period");
            }
            Err(e) => {
                tracing::error!("Failed to refresh leaderboards: {}", e);
            }
        }
    }
}
