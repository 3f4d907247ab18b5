use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde_json::{Value, json};
use uuid::Uuid;

use super::aggregator::PeriodKind;
use crate::{ApiState, error::ApiError};
use terra_db::models::{AllTimeEntry, LeaderboardEntry};

/// Create the leaderboard routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/weekly", get(get_weekly_leaderboard))
        .route("/monthly", get(get_monthly_leaderboard))
        .route("/all-time", get(get_all_time_leaderboard))
        .route("/user/{user_id}/rank", get(get_user_rank))
}

async fn get_weekly_leaderboard(State(state): State<ApiState>) -> Result<Json<Value>, ApiError> {
    snapshot_leaderboard(&state, PeriodKind::Weekly).await
}

async fn get_monthly_leaderboard(State(state): State<ApiState>) -> Result<Json<Value>, ApiError> {
    snapshot_leaderboard(&state, PeriodKind::Monthly).await
}

/// Read the snapshot rows for the current period, best rank first.
async fn snapshot_leaderboard(
    state: &ApiState,
    kind: PeriodKind,
) -> Result<Json<Value>, ApiError> {
    let window = kind.current_window();

    let leaderboard = sqlx::query_as::<_, LeaderboardEntry>(
        // language=PostgreSQL
        r#"
            SELECT l.rank, l.total_xp, l.missions_completed,
                   u.username, u.avatar_url, u.level
            FROM leaderboards l
            JOIN users u ON u.id = l.user_id
            WHERE l.leaderboard_type = $1 AND l.period_start = $2
            ORDER BY l.rank NULLS LAST
            LIMIT 50
        "#,
    )
    .bind(kind.as_str())
    .bind(window.start)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({ "leaderboard": leaderboard })))
}

/// Live ranking straight off the users table, top 100 by total XP.
async fn get_all_time_leaderboard(
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    let rows = sqlx::query_as::<_, AllTimeEntry>(
        // language=PostgreSQL
        r#"
            SELECT username, avatar_url, level, total_xp, coins
            FROM users
            WHERE is_active
            ORDER BY total_xp DESC
            LIMIT 100
        "#,
    )
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    // Rank is the 1-based position in the ordered result
    let leaderboard: Vec<AllTimeEntry> = rows
        .into_iter()
        .enumerate()
        .map(|(i, mut entry)| {
            entry.rank = i as i32 + 1;
            entry
        })
        .collect();

    Ok(Json(json!({ "leaderboard": leaderboard })))
}

/// A user's global rank: one plus the number of active users with strictly
/// more XP. Recomputed on every call; the user base is small enough that
/// the count stays cheap.
async fn get_user_rank(
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let total_xp = sqlx::query_scalar::<_, i32>(
        // language=PostgreSQL
        r#"
            SELECT total_xp
            FROM users
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    let higher = sqlx::query_scalar::<_, i64>(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM users
            WHERE total_xp > $1 AND is_active
        "#,
    )
    .bind(total_xp)
    .fetch_one(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({
        "rank": higher + 1,
        "totalXp": total_xp
    })))
}
