use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};
use terra_db::models::EarnedBadge;

/// Create the badge routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/badges/award", post(award_badge))
        .route("/badges/user/{user_id}", get(get_user_badges))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AwardBadge {
    user_id: Uuid,
    badge_id: i64,
}

/// Award a badge to a user.
///
/// Uniqueness is enforced by the schema: the insert either lands or hits
/// the (user_id, badge_id) constraint, so two concurrent awards can never
/// both succeed.
async fn award_badge(
    State(state): State<ApiState>,
    Json(payload): Json<AwardBadge>,
) -> Result<Json<Value>, ApiError> {
    let awarded = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
        // language=PostgreSQL
        r#"
            INSERT INTO user_badges (user_id, badge_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, badge_id) DO NOTHING
            RETURNING id, earned_at
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.badge_id)
    .fetch_optional(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    let Some((id, earned_at)) = awarded else {
        return Err(ApiError::Domain("Badge already earned".to_string()));
    };

    Ok(Json(json!({
        "message": "Badge awarded successfully",
        "data": {
            "id": id,
            "userId": payload.user_id,
            "badgeId": payload.badge_id,
            "earnedAt": earned_at
        }
    })))
}

async fn get_user_badges(
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
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
    .bind(user_id)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({ "badges": badges })))
}
