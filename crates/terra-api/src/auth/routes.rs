use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use super::{jwt, middleware::AuthUser, password};
use crate::{
    ApiState,
    error::ApiError,
    metrics::record_auth_event,
    middleware::rate_limit,
    validation::validate_request,
};
use terra_db::models::User;

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, date_of_birth, \
     avatar_url, level, total_xp, coins, parent_email, is_active, created_at, updated_at";

/// Create the auth routes
pub fn routes() -> Router<ApiState> {
    let routes = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/user", get(get_user))
        .route("/profile/{user_id}", put(update_profile))
        .route("/logout", post(logout));

    // Strict limits: these endpoints are the brute-force surface
    rate_limit::apply_auth_rate_limit(routes)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct SignupRequest {
    #[validate(email(message = "A valid email address is required"))]
    email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    password: String,
    #[validate(length(min = 3, max = 30, message = "Username must be 3 to 30 characters"))]
    username: String,
    first_name: Option<String>,
    last_name: Option<String>,
    date_of_birth: Option<NaiveDate>,
    #[validate(email(message = "Parent email must be a valid email address"))]
    parent_email: Option<String>,
}

async fn signup(
    State(state): State<ApiState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_request(&payload)?;

    let password_hash = password::hash_password(&payload.password, state.bcrypt_cost)?;

    let user = sqlx::query_as::<_, User>(
        // language=PostgreSQL
        &format!(
            r#"
            INSERT INTO users (email, username, password_hash, first_name, last_name,
                               date_of_birth, parent_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
        "#
        ),
    )
    .bind(&payload.email)
    .bind(&payload.username)
    .bind(&password_hash)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(payload.date_of_birth)
    .bind(&payload.parent_email)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.constraint() == Some("users_email_key") => {
            ApiError::Domain("An account with this email already exists".to_string())
        }
        _ => ApiError::Database(e),
    })?;

    record_auth_event("signup", true);

    Ok(Json(json!({
        "message": "User created successfully",
        "user": user
    })))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<ApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let credentials = sqlx::query_as::<_, (Uuid, String)>(
        // language=PostgreSQL
        r#"
            SELECT id, password_hash
            FROM users
            WHERE email = $1 AND is_active
        "#,
    )
    .bind(&payload.email)
    .fetch_optional(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    let Some((user_id, password_hash)) = credentials else {
        record_auth_event("login", false);
        return Err(ApiError::Domain("Invalid email or password".to_string()));
    };

    if !password::verify_password(&payload.password, &password_hash) {
        record_auth_event("login", false);
        return Err(ApiError::Domain("Invalid email or password".to_string()));
    }

    let user = fetch_user(&state, user_id).await?;
    let token = jwt::generate_jwt_token(
        user_id,
        user.email.clone(),
        &state.jwt_secret,
        state.jwt_expiry_hours,
    )?;

    record_auth_event("login", true);

    Ok(Json(json!({
        "message": "Login successful",
        "user": user,
        "token": token
    })))
}

async fn get_user(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    let user = fetch_user(&state, auth_user.user_id).await?;

    Ok(Json(json!({ "user": user })))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 30, message = "Username must be 3 to 30 characters"))]
    username: String,
    first_name: Option<String>,
    last_name: Option<String>,
    avatar_url: Option<String>,
}

async fn update_profile(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    // Authorization check: a user may only update their own profile
    if auth_user.user_id != user_id {
        return Err(ApiError::Auth(
            "You are not authorized to update this profile".to_string(),
        ));
    }

    validate_request(&payload)?;

    let user = sqlx::query_as::<_, User>(
        // language=PostgreSQL
        &format!(
            r#"
            UPDATE users
            SET username = $1, first_name = $2, last_name = $3, avatar_url = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING {USER_COLUMNS}
        "#
        ),
    )
    .bind(&payload.username)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.avatar_url)
    .bind(user_id)
    .fetch_one(&state.pool)
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": user
    })))
}

async fn logout() -> Json<Value> {
    // Tokens are stateless; the client discards its copy
    Json(json!({ "message": "Logout successful" }))
}

async fn fetch_user(state: &ApiState, user_id: Uuid) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>(
        // language=PostgreSQL
        &format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
        "#
        ),
    )
    .bind(user_id)
    .fetch_one(&state.pool)
    .await
    .map_err(|_| ApiError::Auth("User not found".to_string()))
}
