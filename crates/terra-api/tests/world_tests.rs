mod common;

use axum::http::StatusCode;
use common::{TestClient, TestStateBuilder, db};
use terra_api::router;

// Exercises the whole content hierarchy in one flow so the empty-table
// assertion cannot race against seeding from a parallel test.
#[tokio::test]
async fn test_content_listing() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    db::cleanup(&state.pool)
        .await
        .expect("Failed to clean database");

    let app = router::router().with_state(state.clone());
    let client = TestClient::new(app);

    // An initialized but empty world table is not an error
    let response = client.get("/api/games/worlds").await;
    response.assert_status(StatusCode::OK);
    let json: serde_json::Value = response.json();
    assert_eq!(json["worlds"].as_array().unwrap().len(), 0);

    // Seed two worlds out of order plus one inactive world
    let second = db::create_world(&state.pool, "History Land", 2)
        .await
        .unwrap();
    let first = db::create_world(&state.pool, "Math Galaxy", 1).await.unwrap();
    let hidden = db::create_world(&state.pool, "Unreleased World", 3)
        .await
        .unwrap();
    sqlx::query("UPDATE worlds SET is_active = FALSE WHERE id = $1")
        .bind(hidden)
        .execute(&state.pool)
        .await
        .unwrap();

    let response = client.get("/api/games/worlds").await;
    response.assert_status(StatusCode::OK);
    let json: serde_json::Value = response.json();
    let worlds = json["worlds"].as_array().unwrap();
    assert_eq!(worlds.len(), 2, "inactive worlds are not listed");
    assert_eq!(worlds[0]["id"].as_i64().unwrap(), first);
    assert_eq!(worlds[1]["id"].as_i64().unwrap(), second);

    // Missions are scoped to their world and ordered
    let mission = db::create_mission(&state.pool, first, "Counting Stars", 50, 20, 1)
        .await
        .unwrap();
    db::create_mission(&state.pool, second, "Ancient Rome", 60, 25, 2)
        .await
        .unwrap();

    let response = client
        .get(&format!("/api/games/worlds/{first}/missions"))
        .await;
    response.assert_status(StatusCode::OK);
    let json: serde_json::Value = response.json();
    let missions = json["missions"].as_array().unwrap();
    assert_eq!(missions.len(), 1);
    assert_eq!(missions[0]["title"].as_str().unwrap(), "Counting Stars");

    // Games are scoped to their mission
    db::create_game(&state.pool, mission, "Number Hunt")
        .await
        .unwrap();

    let response = client
        .get(&format!("/api/games/missions/{mission}/games"))
        .await;
    response.assert_status(StatusCode::OK);
    let json: serde_json::Value = response.json();
    let games = json["games"].as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["name"].as_str().unwrap(), "Number Hunt");

    // A world with no missions lists as empty, not as an error
    let response = client
        .get(&format!("/api/games/worlds/{hidden}/missions"))
        .await;
    response.assert_status(StatusCode::OK);
    let json: serde_json::Value = response.json();
    assert_eq!(json["missions"].as_array().unwrap().len(), 0);
}
