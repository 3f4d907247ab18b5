use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    ApiState,
    error::ApiError,
    validation::{validate_completion_percentage, validate_non_negative},
};
use terra_db::models::{GameScore, ProgressWithMission, ScoreWithGame, UserProgress};
use terra_progression::{MissionStatus, level_for_xp, status_for_completion};

/// Create the mission-progress and game-score routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/progress/mission", post(save_mission_progress))
        .route("/progress/user/{user_id}", get(get_user_progress))
        .route("/scores/save", post(save_game_score))
        .route("/scores/user/{user_id}", get(get_user_scores))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveMissionProgress {
    user_id: Uuid,
    mission_id: i64,
    score: i32,
    completion_percentage: i32,
    time_spent: i32,
}

/// Save (upsert) a user's progress on a mission.
///
/// When the completion percentage reaches exactly 100 the mission's
/// configured rewards are applied to the user's totals in the same
/// transaction, as a single increment so concurrent saves cannot lose
/// updates. Leaderboard snapshots are deliberately not touched here; the
/// periodic aggregator picks the change up on its next pass.
async fn save_mission_progress(
    State(state): State<ApiState>,
    Json(payload): Json<SaveMissionProgress>,
) -> Result<Json<Value>, ApiError> {
    validate_completion_percentage(payload.completion_percentage)?;
    validate_non_negative("score", payload.score)?;
    validate_non_negative("timeSpent", payload.time_spent)?;

    let status = status_for_completion(payload.completion_percentage);

    let mut tx = state.pool.begin().await.map_err(ApiError::Database)?;

    let progress = sqlx::query_as::<_, UserProgress>(
        // language=PostgreSQL
        r#"
            INSERT INTO user_progress
                (user_id, mission_id, score, completion_percentage, time_spent, status,
                 completed_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6,
                    CASE WHEN $6 = 'completed' THEN NOW() END, NOW())
            ON CONFLICT (user_id, mission_id)
            DO UPDATE SET
                score = $3,
                completion_percentage = $4,
                time_spent = $5,
                status = $6,
                completed_at = CASE WHEN $6 = 'completed' THEN NOW()
                               ELSE user_progress.completed_at END,
                updated_at = NOW()
            RETURNING id, user_id, mission_id, score, completion_percentage, time_spent,
                      status, completed_at, updated_at
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.mission_id)
    .bind(payload.score)
    .bind(payload.completion_percentage)
    .bind(payload.time_spent)
    .bind(status.as_str())
    .fetch_one(&mut *tx)
    .await
    .map_err(ApiError::Database)?;

    // Apply the mission's rewards on completion
    if status == MissionStatus::Completed {
        let rewards = sqlx::query_as::<_, (i32, i32)>(
            // language=PostgreSQL
            r#"
                SELECT xp_reward, coin_reward
                FROM missions
                WHERE id = $1
            "#,
        )
        .bind(payload.mission_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(ApiError::Database)?;

        if let Some((xp_reward, coin_reward)) = rewards {
            let new_total_xp = sqlx::query_scalar::<_, i32>(
                // language=PostgreSQL
                r#"
                    UPDATE users
                    SET total_xp = total_xp + $1, coins = coins + $2, updated_at = NOW()
                    WHERE id = $3
                    RETURNING total_xp
                "#,
            )
            .bind(xp_reward)
            .bind(coin_reward)
            .bind(payload.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(ApiError::Database)?;

            sqlx::query(
                // language=PostgreSQL
                r#"
                    UPDATE users
                    SET level = $1
                    WHERE id = $2
                "#,
            )
            .bind(level_for_xp(i64::from(new_total_xp)))
            .bind(payload.user_id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::Database)?;
        }
    }

    tx.commit().await.map_err(ApiError::Database)?;

    Ok(Json(json!({
        "message": "Progress saved successfully",
        "data": progress
    })))
}

async fn get_user_progress(
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let progress = sqlx::query_as::<_, ProgressWithMission>(
        // language=PostgreSQL
        r#"
            SELECT p.mission_id, p.score, p.completion_percentage, p.time_spent,
                   p.status, p.completed_at, p.updated_at,
                   m.title AS mission_title, w.name AS world_name
            FROM user_progress p
            JOIN missions m ON m.id = p.mission_id
            JOIN worlds w ON w.id = m.world_id
            WHERE p.user_id = $1
            ORDER BY p.updated_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({ "progress": progress })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveGameScore {
    user_id: Uuid,
    game_id: i64,
    score: i32,
    max_possible_score: i32,
    time_taken: i32,
    game_data: Option<Value>,
}

/// Record one game attempt. Scores are append-only, never updated.
async fn save_game_score(
    State(state): State<ApiState>,
    Json(payload): Json<SaveGameScore>,
) -> Result<Json<Value>, ApiError> {
    validate_non_negative("score", payload.score)?;
    validate_non_negative("maxPossibleScore", payload.max_possible_score)?;
    validate_non_negative("timeTaken", payload.time_taken)?;

    let score = sqlx::query_as::<_, GameScore>(
        // language=PostgreSQL
        r#"
            INSERT INTO game_scores
                (user_id, game_id, score, max_possible_score, time_taken, game_data)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, game_id, score, max_possible_score, time_taken,
                      game_data, created_at
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.game_id)
    .bind(payload.score)
    .bind(payload.max_possible_score)
    .bind(payload.time_taken)
    .bind(&payload.game_data)
    .fetch_one(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({
        "message": "Score saved successfully",
        "data": score
    })))
}

async fn get_user_scores(
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
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
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({ "scores": scores })))
}
