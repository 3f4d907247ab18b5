use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, validation::validate_non_negative};
use terra_db::models::{DailyChallenge, UserDailyChallenge};

/// Create the daily-challenge routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/daily-challenge", get(get_daily_challenge))
        .route("/daily-challenge/complete", post(complete_daily_challenge))
}

/// Fetch today's challenge. A day without a challenge is not an error;
/// the client just gets `null`.
async fn get_daily_challenge(State(state): State<ApiState>) -> Result<Json<Value>, ApiError> {
    let today = Utc::now().date_naive();

    let challenge = sqlx::query_as::<_, DailyChallenge>(
        // language=PostgreSQL
        r#"
            SELECT id, challenge_date, title, description, xp_reward, is_active
            FROM daily_challenges
            WHERE challenge_date = $1 AND is_active
        "#,
    )
    .bind(today)
    .fetch_optional(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({ "challenge": challenge })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteChallenge {
    user_id: Uuid,
    challenge_id: i64,
    score: i32,
}

async fn complete_daily_challenge(
    State(state): State<ApiState>,
    Json(payload): Json<CompleteChallenge>,
) -> Result<Json<Value>, ApiError> {
    validate_non_negative("score", payload.score)?;

    let completion = sqlx::query_as::<_, UserDailyChallenge>(
        // language=PostgreSQL
        r#"
            INSERT INTO user_daily_challenges (user_id, challenge_id, completed, score, completed_at)
            VALUES ($1, $2, TRUE, $3, NOW())
            ON CONFLICT (user_id, challenge_id)
            DO UPDATE SET completed = TRUE, score = $3, completed_at = NOW()
            RETURNING id, user_id, challenge_id, completed, score, completed_at
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.challenge_id)
    .bind(payload.score)
    .fetch_one(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({
        "message": "Daily challenge completed successfully",
        "data": completion
    })))
}
