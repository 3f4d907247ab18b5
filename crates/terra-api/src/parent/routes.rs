use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, middleware::rate_limit};
use terra_db::models::{Badge, EarnedBadge, Mission, ScoreWithGame, User};
use terra_progression::xp_for_next_level;

const CONTENT_FILTERS: &[&str] = &["strict", "moderate", "relaxed"];

/// Create the parent dashboard routes
pub fn routes() -> Router<ApiState> {
    let routes = Router::new()
        .route("/dashboard/{parent_email}", get(get_dashboard))
        .route("/child/{child_id}/progress", get(get_child_progress))
        .route("/child/{child_id}/activity", get(get_child_activity))
        .route(
            "/child/{child_id}/recommendations",
            get(get_recommendations),
        )
        .route("/child/{child_id}/settings", put(update_settings));

    rate_limit::apply_general_rate_limit(routes)
}

#[derive(Debug, sqlx::FromRow)]
struct ChildRow {
    id: Uuid,
    username: String,
    level: i32,
    total_xp: i32,
    coins: i32,
    created_at: DateTime<Utc>,
    total_missions: i64,
    completed_missions: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChildSummary {
    id: Uuid,
    username: String,
    level: i32,
    total_xp: i32,
    coins: i32,
    created_at: DateTime<Utc>,
    total_missions: i64,
    completed_missions: i64,
    completion_rate: i64,
}

/// Dashboard summary for all of a parent's children.
///
/// One grouped query computes the per-child mission counts in the store;
/// there is no per-child query fan-out to fail halfway through.
async fn get_dashboard(
    State(state): State<ApiState>,
    Path(parent_email): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let rows = sqlx::query_as::<_, ChildRow>(
        // language=PostgreSQL
        r#"
            SELECT u.id, u.username, u.level, u.total_xp, u.coins, u.created_at,
                   COUNT(p.id) AS total_missions,
                   COUNT(p.id) FILTER (WHERE p.status = 'completed') AS completed_missions
            FROM users u
            LEFT JOIN user_progress p ON p.user_id = u.id
            WHERE u.parent_email = $1 AND u.is_active
            GROUP BY u.id
            ORDER BY u.created_at
        "#,
    )
    .bind(&parent_email)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    let total_children = rows.len();
    let total_xp: i64 = rows.iter().map(|c| i64::from(c.total_xp)).sum();

    let children: Vec<ChildSummary> = rows
        .into_iter()
        .map(|c| ChildSummary {
            completion_rate: completion_rate(c.completed_missions, c.total_missions),
            id: c.id,
            username: c.username,
            level: c.level,
            total_xp: c.total_xp,
            coins: c.coins,
            created_at: c.created_at,
            total_missions: c.total_missions,
            completed_missions: c.completed_missions,
        })
        .collect();

    Ok(Json(json!({
        "children": children,
        "totalChildren": total_children,
        "totalXp": total_xp
    })))
}

#[derive(Debug, sqlx::FromRow)]
struct ChildProgressRow {
    status: String,
    completion_percentage: i32,
    time_spent: i32,
    mission_title: String,
    world_name: String,
    theme_color: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorldRollup {
    world_name: String,
    theme_color: Option<String>,
    total_missions: i64,
    completed_missions: i64,
    total_time_spent: i64,
}

async fn get_child_progress(
    State(state): State<ApiState>,
    Path(child_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let child = sqlx::query_as::<_, (String, i32, i32, i32, DateTime<Utc>)>(
        // language=PostgreSQL
        r#"
            SELECT username, level, total_xp, coins, created_at
            FROM users
            WHERE id = $1
        "#,
    )
    .bind(child_id)
    .fetch_one(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    let progress = sqlx::query_as::<_, ChildProgressRow>(
        // language=PostgreSQL
        r#"
            SELECT p.status, p.completion_percentage, p.time_spent,
                   m.title AS mission_title, w.name AS world_name, w.theme_color
            FROM user_progress p
            JOIN missions m ON m.id = p.mission_id
            JOIN worlds w ON w.id = m.world_id
            WHERE p.user_id = $1
        "#,
    )
    .bind(child_id)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    let badges = sqlx::query_as::<_, EarnedBadge>(
        // language=PostgreSQL
        r#"
            SELECT ub.badge_id, ub.earned_at,
                   b.name, b.description, b.icon_url, b.rarity
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = $1
            ORDER BY ub.earned_at DESC
        "#,
    )
    .bind(child_id)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    let total_missions = progress.len() as i64;
    let completed_missions = progress.iter().filter(|p| p.status == "completed").count() as i64;
    let total_time_spent: i64 = progress.iter().map(|p| i64::from(p.time_spent)).sum();

    // Roll progress up per world
    let mut worlds: HashMap<String, WorldRollup> = HashMap::new();
    for row in &progress {
        let entry = worlds
            .entry(row.world_name.clone())
            .or_insert_with(|| WorldRollup {
                world_name: row.world_name.clone(),
                theme_color: row.theme_color.clone(),
                total_missions: 0,
                completed_missions: 0,
                total_time_spent: 0,
            });
        entry.total_missions += 1;
        if row.status == "completed" {
            entry.completed_missions += 1;
        }
        entry.total_time_spent += i64::from(row.time_spent);
    }
    let mut world_progress: Vec<WorldRollup> = worlds.into_values().collect();
    world_progress.sort_by(|a, b| a.world_name.cmp(&b.world_name));

    let recent_badges: Vec<&EarnedBadge> = badges.iter().take(5).collect();

    Ok(Json(json!({
        "child": {
            "username": child.0,
            "level": child.1,
            "totalXp": child.2,
            "coins": child.3,
            "createdAt": child.4
        },
        "summary": {
            "totalMissions": total_missions,
            "completedMissions": completed_missions,
            "completionRate": completion_rate(completed_missions, total_missions),
            // Reported in minutes
            "totalTimeSpent": (total_time_spent as f64 / 60.0).round() as i64,
            "badgesEarned": badges.len()
        },
        "worldProgress": world_progress,
        "recentBadges": recent_badges
    })))
}

#[derive(Debug, Deserialize)]
struct ActivityQuery {
    days: Option<i64>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
struct ActivityProgress {
    status: String,
    completion_percentage: i32,
    time_spent: i32,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
    mission_title: String,
    world_name: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
struct ActivityChallenge {
    completed: bool,
    score: Option<i32>,
    completed_at: Option<DateTime<Utc>>,
    title: String,
    description: Option<String>,
}

async fn get_child_activity(
    State(state): State<ApiState>,
    Path(child_id): Path<Uuid>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Value>, ApiError> {
    let days = query.days.unwrap_or(7).clamp(1, 90);
    let since = Utc::now() - Duration::days(days);

    let progress = sqlx::query_as::<_, ActivityProgress>(
        // language=PostgreSQL
        r#"
            SELECT p.status, p.completion_percentage, p.time_spent, p.completed_at,
                   p.updated_at, m.title AS mission_title, w.name AS world_name
            FROM user_progress p
            JOIN missions m ON m.id = p.mission_id
            JOIN worlds w ON w.id = m.world_id
            WHERE p.user_id = $1 AND p.updated_at >= $2
            ORDER BY p.updated_at DESC
        "#,
    )
    .bind(child_id)
    .bind(since)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    let scores = sqlx::query_as::<_, ScoreWithGame>(
        // language=PostgreSQL
        r#"
            SELECT s.score, s.max_possible_score, s.time_taken, s.created_at,
                   g.name AS game_name, g.game_type,
                   m.title AS mission_title, w.name AS world_name
            FROM game_scores s
            JOIN games g ON g.id = s.game_id
            JOIN missions m ON m.id = g.mission_id
            JOIN worlds w ON w.id = m.world_id
            WHERE s.user_id = $1 AND s.created_at >= $2
            ORDER BY s.created_at DESC
        "#,
    )
    .bind(child_id)
    .bind(since)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    let challenges = sqlx::query_as::<_, ActivityChallenge>(
        // language=PostgreSQL
        r#"
            SELECT uc.completed, uc.score, uc.completed_at, dc.title, dc.description
            FROM user_daily_challenges uc
            JOIN daily_challenges dc ON dc.id = uc.challenge_id
            WHERE uc.user_id = $1 AND uc.completed AND uc.completed_at >= $2
            ORDER BY uc.completed_at DESC
        "#,
    )
    .bind(child_id)
    .bind(since)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({
        "progress": progress,
        "scores": scores,
        "challenges": challenges
    })))
}

async fn get_recommendations(
    State(state): State<ApiState>,
    Path(child_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let (level, _total_xp) = sqlx::query_as::<_, (i32, i32)>(
        // language=PostgreSQL
        r#"
            SELECT level, total_xp
            FROM users
            WHERE id = $1
        "#,
    )
    .bind(child_id)
    .fetch_one(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    let completed_ids = sqlx::query_scalar::<_, i64>(
        // language=PostgreSQL
        r#"
            SELECT mission_id
            FROM user_progress
            WHERE user_id = $1 AND status = 'completed'
        "#,
    )
    .bind(child_id)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    // Active missions the child has not completed, gently above their level
    let recommended = sqlx::query_as::<_, Mission>(
        // language=PostgreSQL
        r#"
            SELECT id, world_id, title, description, difficulty_level,
                   xp_reward, coin_reward, order_index, is_active
            FROM missions
            WHERE is_active AND difficulty_level <= $1 AND id <> ALL($2)
            ORDER BY difficulty_level, order_index
            LIMIT 5
        "#,
    )
    .bind(level + 1)
    .bind(&completed_ids)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    let available_badges = sqlx::query_as::<_, Badge>(
        // language=PostgreSQL
        r#"
            SELECT id, name, description, icon_url, rarity, requirements, is_active
            FROM badges
            WHERE is_active
            LIMIT 3
        "#,
    )
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({
        "recommendedMissions": recommended,
        "availableBadges": available_badges,
        "currentLevel": level,
        "nextLevelXp": xp_for_next_level(level)
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSettings {
    daily_time_limit: Option<i32>,
    content_filter: Option<String>,
    notifications: Option<bool>,
}

async fn update_settings(
    State(state): State<ApiState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<UpdateSettings>,
) -> Result<Json<Value>, ApiError> {
    if let Some(limit) = payload.daily_time_limit {
        if !(0..=480).contains(&limit) {
            return Err(ApiError::Validation(format!(
                "dailyTimeLimit must be between 0 and 480 minutes, got {limit}"
            )));
        }
    }
    if let Some(filter) = payload.content_filter.as_deref() {
        if !CONTENT_FILTERS.contains(&filter) {
            return Err(ApiError::Validation(format!(
                "contentFilter must be one of strict, moderate, relaxed; got '{filter}'"
            )));
        }
    }

    let user = sqlx::query_as::<_, User>(
        // language=PostgreSQL
        r#"
            UPDATE users
            SET daily_time_limit = $1, content_filter = $2, parent_notifications = $3,
                updated_at = NOW()
            WHERE id = $4
            RETURNING id, email, username, first_name, last_name, date_of_birth,
                      avatar_url, level, total_xp, coins, parent_email, is_active,
                      created_at, updated_at
        "#,
    )
    .bind(payload.daily_time_limit)
    .bind(&payload.content_filter)
    .bind(payload.notifications)
    .bind(child_id)
    .fetch_one(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({
        "message": "Parent settings updated successfully",
        "data": user
    })))
}

/// Percentage of missions completed, rounded to the nearest whole number.
fn completion_rate(completed: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as i64
}
