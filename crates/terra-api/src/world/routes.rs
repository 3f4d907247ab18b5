use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde_json::{Value, json};

use crate::{ApiState, error::ApiError};
use terra_db::models::{Game, Mission, World};

/// Create the world/mission/game content routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/worlds", get(get_worlds))
        .route("/worlds/{world_id}/missions", get(get_world_missions))
        .route("/missions/{mission_id}/games", get(get_mission_games))
}

async fn get_worlds(State(state): State<ApiState>) -> Result<Json<Value>, ApiError> {
    let worlds = sqlx::query_as::<_, World>(
        // language=PostgreSQL
        r#"
            SELECT id, name, description, theme_color, order_index, is_active
            FROM worlds
            WHERE is_active
            ORDER BY order_index
        "#,
    )
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({ "worlds": worlds })))
}

async fn get_world_missions(
    State(state): State<ApiState>,
    Path(world_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let missions = sqlx::query_as::<_, Mission>(
        // language=PostgreSQL
        r#"
            SELECT id, world_id, title, description, difficulty_level,
                   xp_reward, coin_reward, order_index, is_active
            FROM missions
            WHERE world_id = $1 AND is_active
            ORDER BY order_index
        "#,
    )
    .bind(world_id)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({ "missions": missions })))
}

async fn get_mission_games(
    State(state): State<ApiState>,
    Path(mission_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let games = sqlx::query_as::<_, Game>(
        // language=PostgreSQL
        r#"
            SELECT id, mission_id, name, game_type, order_index, is_active
            FROM games
            WHERE mission_id = $1 AND is_active
            ORDER BY order_index
        "#,
    )
    .bind(mission_id)
    .fetch_all(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({ "games": games })))
}
