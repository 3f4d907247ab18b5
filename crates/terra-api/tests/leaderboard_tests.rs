mod common;

use axum::http::StatusCode;
use common::{TestClient, TestStateBuilder, db, test_data};
use terra_api::{leaderboard::aggregator, router};

#[tokio::test]
async fn test_snapshot_upsert_is_idempotent_overwrite() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let user_id = db::create_test_user(
        &state.pool,
        &test_data::unique_email("snapshot"),
        &test_data::unique_username("snapshot"),
    )
    .await
    .unwrap();

    db::set_user_xp(&state.pool, user_id, 100).await.unwrap();
    aggregator::update_leaderboard(&state.pool, user_id)
        .await
        .unwrap();

    // Same period, new XP: the row must be overwritten, not duplicated
    db::set_user_xp(&state.pool, user_id, 250).await.unwrap();
    aggregator::update_leaderboard(&state.pool, user_id)
        .await
        .unwrap();

    let rows = sqlx::query_as::<_, (String, i32)>(
        r#"
        SELECT leaderboard_type, total_xp
        FROM leaderboards
        WHERE user_id = $1
        ORDER BY leaderboard_type
        "#,
    )
    .bind(user_id)
    .fetch_all(&state.pool)
    .await
    .unwrap();

    // Exactly one weekly and one monthly row, both with the latest XP
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], ("monthly".to_string(), 250));
    assert_eq!(rows[1], ("weekly".to_string(), 250));
}

#[tokio::test]
async fn test_aggregator_owns_rank() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let app = router::router().with_state(state.clone());
    let client = TestClient::new(app);

    // Drop high-XP snapshot rows left by earlier runs so our two users
    // stay inside the top-50 window
    sqlx::query("DELETE FROM leaderboards WHERE total_xp >= 500000")
        .execute(&state.pool)
        .await
        .unwrap();

    let leader = db::create_test_user(
        &state.pool,
        &test_data::unique_email("leader"),
        &test_data::unique_username("rank_leader"),
    )
    .await
    .unwrap();
    let runner_up = db::create_test_user(
        &state.pool,
        &test_data::unique_email("runnerup"),
        &test_data::unique_username("rank_runner"),
    )
    .await
    .unwrap();

    db::set_user_xp(&state.pool, leader, 700_000).await.unwrap();
    db::set_user_xp(&state.pool, runner_up, 600_000).await.unwrap();

    aggregator::update_leaderboard(&state.pool, leader).await.unwrap();
    aggregator::update_leaderboard(&state.pool, runner_up)
        .await
        .unwrap();

    let response = client.get("/api/leaderboard/weekly").await;
    response.assert_status(StatusCode::OK);
    let json: serde_json::Value = response.json();
    let entries = json["leaderboard"].as_array().unwrap();
    assert!(entries.len() >= 2);

    // Every returned entry has a rank, and ranks are ascending
    let ranks: Vec<i64> = entries
        .iter()
        .map(|e| e["rank"].as_i64().expect("rank must be set"))
        .collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));

    // Our leader outranks our runner-up
    let pos = |name: &str| {
        entries
            .iter()
            .position(|e| e["username"] == name)
            .expect("seeded user missing from leaderboard")
    };
    let leader_name = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = $1")
        .bind(leader)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    let runner_name = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = $1")
        .bind(runner_up)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert!(pos(&leader_name) < pos(&runner_name));
}

#[tokio::test]
async fn test_all_time_leaderboard_ranks_by_position() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let app = router::router().with_state(state.clone());
    let client = TestClient::new(app);

    let top = db::create_test_user(
        &state.pool,
        &test_data::unique_email("alltime_top"),
        &test_data::unique_username("alltime_top"),
    )
    .await
    .unwrap();
    let second = db::create_test_user(
        &state.pool,
        &test_data::unique_email("alltime_second"),
        &test_data::unique_username("alltime_second"),
    )
    .await
    .unwrap();
    db::set_user_xp(&state.pool, top, 8_000_000).await.unwrap();
    db::set_user_xp(&state.pool, second, 7_000_000).await.unwrap();

    let response = client.get("/api/leaderboard/all-time").await;
    response.assert_status(StatusCode::OK);
    let json: serde_json::Value = response.json();
    let entries = json["leaderboard"].as_array().unwrap();

    assert!(entries.len() <= 100);

    // Strictly ordered by XP descending, rank equal to 1-based position
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry["rank"].as_i64().unwrap(), i as i64 + 1);
        if i > 0 {
            assert!(
                entries[i - 1]["total_xp"].as_i64().unwrap()
                    >= entry["total_xp"].as_i64().unwrap()
            );
        }
    }

    // Our two seeded users appear in XP order
    let pos_top = entries
        .iter()
        .position(|e| e["total_xp"].as_i64() == Some(8_000_000))
        .expect("top seeded user missing");
    let pos_second = entries
        .iter()
        .position(|e| e["total_xp"].as_i64() == Some(7_000_000))
        .expect("second seeded user missing");
    assert!(pos_top < pos_second);
}

#[tokio::test]
async fn test_user_rank_counts_strictly_greater() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let app = router::router().with_state(state.clone());
    let client = TestClient::new(app);

    // Retire leftovers from earlier runs so the top spots are ours
    sqlx::query("UPDATE users SET is_active = FALSE WHERE total_xp >= 9000000")
        .execute(&state.pool)
        .await
        .unwrap();

    let top = db::create_test_user(
        &state.pool,
        &test_data::unique_email("rank_top"),
        &test_data::unique_username("rank_top"),
    )
    .await
    .unwrap();
    let second = db::create_test_user(
        &state.pool,
        &test_data::unique_email("rank_second"),
        &test_data::unique_username("rank_second"),
    )
    .await
    .unwrap();
    db::set_user_xp(&state.pool, top, 9_999_999).await.unwrap();
    db::set_user_xp(&state.pool, second, 9_999_998).await.unwrap();

    // The highest-XP active user must be rank 1
    let response = client
        .get(&format!("/api/leaderboard/user/{top}/rank"))
        .await;
    response.assert_status(StatusCode::OK);
    let json: serde_json::Value = response.json();
    assert_eq!(json["rank"].as_i64().unwrap(), 1);
    assert_eq!(json["totalXp"].as_i64().unwrap(), 9_999_999);

    // rank = 1 + count of users with strictly greater XP
    let response = client
        .get(&format!("/api/leaderboard/user/{second}/rank"))
        .await;
    response.assert_status(StatusCode::OK);
    let json: serde_json::Value = response.json();
    assert_eq!(json["rank"].as_i64().unwrap(), 2);
}
