use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User profile as exposed through the API.
///
/// The password hash is deliberately not part of this model; login reads it
/// with a dedicated scalar query.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Login email (unique)
    pub email: String,
    /// Display name shown in games and leaderboards
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    /// Current level, derived from total XP
    pub level: i32,
    /// Cumulative XP across all completed missions
    pub total_xp: i32,
    /// Spendable coins earned from missions
    pub coins: i32,
    /// Email of the supervising parent, if any
    pub parent_email: Option<String>,
    /// Deactivated accounts are kept but excluded from rankings
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// World model - a themed collection of missions
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct World {
    /// Unique world identifier
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Accent color used by the client when rendering this world
    pub theme_color: Option<String>,
    /// Position in the world list
    pub order_index: i32,
    pub is_active: bool,
}

/// Mission model - a completable content unit carrying XP/coin rewards
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Mission {
    /// Unique mission identifier
    pub id: i64,
    /// World this mission belongs to (indexed)
    pub world_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Difficulty tier used by recommendations (1 = easiest)
    pub difficulty_level: i32,
    /// XP granted when the mission is completed
    pub xp_reward: i32,
    /// Coins granted when the mission is completed
    pub coin_reward: i32,
    pub order_index: i32,
    pub is_active: bool,
}

/// Game model - a playable activity inside a mission
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Game {
    /// Unique game identifier
    pub id: i64,
    /// Mission this game belongs to (indexed)
    pub mission_id: i64,
    pub name: String,
    pub game_type: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
}

/// Per-user mission progress, at most one row per (user, mission).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProgress {
    pub id: i64,
    pub user_id: Uuid,
    pub mission_id: i64,
    pub score: i32,
    /// 0..=100; exactly 100 marks the mission completed
    pub completion_percentage: i32,
    /// Seconds spent on the mission so far
    pub time_spent: i32,
    /// "in_progress" or "completed"
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Progress row joined with its mission and world for display.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProgressWithMission {
    pub mission_id: i64,
    pub score: i32,
    pub completion_percentage: i32,
    pub time_spent: i32,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub mission_title: String,
    pub world_name: String,
}

/// Append-only record of a single game attempt. Never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GameScore {
    pub id: i64,
    pub user_id: Uuid,
    pub game_id: i64,
    pub score: i32,
    pub max_possible_score: i32,
    /// Seconds the attempt took
    pub time_taken: i32,
    /// Free-form payload the game recorded for this attempt
    pub game_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Game score joined with game and mission names, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScoreWithGame {
    pub score: i32,
    pub max_possible_score: i32,
    pub time_taken: i32,
    pub created_at: DateTime<Utc>,
    pub game_name: String,
    pub game_type: Option<String>,
    pub mission_title: String,
    pub world_name: String,
}

/// Badge model - static content describing an earnable badge
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Badge {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    /// e.g. "common", "rare", "legendary"
    pub rarity: Option<String>,
    /// Human-readable description of how to earn this badge
    pub requirements: Option<String>,
    pub is_active: bool,
}

/// A badge a user has earned, with the badge metadata joined in.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EarnedBadge {
    pub badge_id: i64,
    pub earned_at: DateTime<Utc>,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub rarity: Option<String>,
}

/// Snapshot leaderboard entry for a weekly or monthly period,
/// joined with the user's public profile fields.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub rank: Option<i32>,
    pub total_xp: i32,
    pub missions_completed: i32,
    pub username: String,
    pub avatar_url: Option<String>,
    pub level: i32,
}

/// Live all-time ranking entry computed straight from the users table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AllTimeEntry {
    #[sqlx(default)]
    pub rank: i32,
    pub username: String,
    pub avatar_url: Option<String>,
    pub level: i32,
    pub total_xp: i32,
    pub coins: i32,
}

/// Daily challenge content, one per calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyChallenge {
    pub id: i64,
    pub challenge_date: NaiveDate,
    pub title: String,
    pub description: Option<String>,
    pub xp_reward: i32,
    pub is_active: bool,
}

/// A user's completion record for a daily challenge.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserDailyChallenge {
    pub id: i64,
    pub user_id: Uuid,
    pub challenge_id: i64,
    pub completed: bool,
    pub score: Option<i32>,
    pub completed_at: Option<DateTime<Utc>>,
}
