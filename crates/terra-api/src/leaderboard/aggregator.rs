//! Leaderboard snapshot recomputation.
//!
//! Snapshot rows are recomputed, never incrementally maintained: each pass
//! overwrites the row for the current period via upsert, so running it
//! twice in the same period is a no-op beyond refreshing the values. Ranks
//! are rewritten here as well; no other code path touches the `rank`
//! column.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use terra_progression::{Period, month_window, week_window};

/// The two snapshot window types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Weekly,
    Monthly,
}

impl PeriodKind {
    /// The value stored in the `leaderboards.leaderboard_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// The window of this kind containing today.
    #[must_use]
    pub fn current_window(self) -> Period {
        let today = Utc::now().date_naive();
        match self {
            Self::Weekly => week_window(today),
            Self::Monthly => month_window(today),
        }
    }
}

/// Recompute one user's weekly and monthly snapshot rows.
///
/// Reads the user's current XP and completed-mission count and upserts one
/// row per window type, then rewrites the ranks for both current periods.
/// A missing or deactivated user is silently skipped.
pub async fn update_leaderboard(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    let stats = sqlx::query_as::<_, (i32,)>(
        // language=PostgreSQL
        r#"
            SELECT total_xp
            FROM users
            WHERE id = $1 AND is_active
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some((total_xp,)) = stats else {
        return Ok(());
    };

    let missions_completed = sqlx::query_scalar::<_, i64>(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM user_progress
            WHERE user_id = $1 AND status = 'completed'
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    for kind in [PeriodKind::Weekly, PeriodKind::Monthly] {
        let window = kind.current_window();

        sqlx::query(
            // language=PostgreSQL
            r#"
                INSERT INTO leaderboards
                    (user_id, leaderboard_type, period_start, period_end,
                     total_xp, missions_completed, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, NOW())
                ON CONFLICT (user_id, leaderboard_type, period_start)
                DO UPDATE SET
                    period_end = $4,
                    total_xp = $5,
                    missions_completed = $6,
                    updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(window.start)
        .bind(window.end)
        .bind(total_xp)
        .bind(missions_completed as i32)
        .execute(pool)
        .await?;

        recompute_ranks(pool, kind, window).await?;
    }

    Ok(())
}

/// Refresh snapshots for every user active in the current periods.
///
/// This is the periodic trigger: the mission-progress endpoint never
/// touches leaderboard rows, so staleness between a completion and the
/// next pass here is expected and tolerated.
pub async fn refresh_current_periods(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let mut refreshed = 0;

    for kind in [PeriodKind::Weekly, PeriodKind::Monthly] {
        let window = kind.current_window();

        let result = sqlx::query(
            // language=PostgreSQL
            r#"
                INSERT INTO leaderboards
                    (user_id, leaderboard_type, period_start, period_end,
                     total_xp, missions_completed, updated_at)
                SELECT u.id, $1, $2, $3, u.total_xp,
                       COUNT(p.id) FILTER (WHERE p.status = 'completed')::int,
                       NOW()
                FROM users u
                LEFT JOIN user_progress p ON p.user_id = u.id
                WHERE u.is_active
                  AND EXISTS (
                      SELECT 1 FROM user_progress q
                      WHERE q.user_id = u.id AND q.updated_at >= $2
                  )
                GROUP BY u.id
                ON CONFLICT (user_id, leaderboard_type, period_start)
                DO UPDATE SET
                    period_end = EXCLUDED.period_end,
                    total_xp = EXCLUDED.total_xp,
                    missions_completed = EXCLUDED.missions_completed,
                    updated_at = NOW()
            "#,
        )
        .bind(kind.as_str())
        .bind(window.start)
        .bind(window.end)
        .execute(pool)
        .await?;

        refreshed += result.rows_affected();

        recompute_ranks(pool, kind, window).await?;
    }

    Ok(refreshed)
}

/// Rewrite the `rank` column for one period from its XP ordering.
async fn recompute_ranks(
    pool: &PgPool,
    kind: PeriodKind,
    window: Period,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE leaderboards l
            SET rank = ranked.new_rank
            FROM (
                SELECT id,
                       ROW_NUMBER() OVER (
                           ORDER BY total_xp DESC, missions_completed DESC, user_id
                       )::int AS new_rank
                FROM leaderboards
                WHERE leaderboard_type = $1 AND period_start = $2
            ) ranked
            WHERE l.id = ranked.id
        "#,
    )
    .bind(kind.as_str())
    .bind(window.start)
    .execute(pool)
    .await?;

    Ok(())
}
