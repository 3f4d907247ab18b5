use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};

use crate::{auth, badge, challenge, leaderboard, parent, progress, state::ApiState, world};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth::routes())
        .nest("/api/games", games_routes())
        .nest("/api/leaderboard", leaderboard::routes())
        .nest("/api/parents", parent::routes())
        .fallback(handler_404)
}

/// Mission content, progress, scores, badges, and daily challenges all hang
/// off /api/games, mirroring how the clients call them.
fn games_routes() -> Router<ApiState> {
    world::routes()
        .merge(progress::routes())
        .merge(badge::routes())
        .merge(challenge::routes())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
