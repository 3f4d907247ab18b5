use std::net::SocketAddr;

use axum::{Router, middleware::from_fn, routing::get};
use terra_api::{
    config::ApiConfig,
    jobs, metrics,
    middleware::{cors, request_id, security_headers},
    state::ApiState,
    tracing as api_tracing,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    api_tracing::init_tracing(config.env);

    // Database pool and migrations
    let pool = terra_db::create_pool(&config.database_url, config.db_max_connections).await?;
    terra_db::ensure_db_and_migrate(&config.database_url, &pool).await?;

    // Prometheus exporter
    let metrics_handle = metrics::init_metrics()?;

    let state = ApiState::new(&config, pool.clone());

    // Periodic leaderboard recomputation
    let _jobs = jobs::start_background_jobs(pool);

    // Create the application router
    let app = terra_api::router::router()
        .with_state(state)
        .merge(
            Router::new()
                .route("/metrics", get(metrics::metrics_handler))
                .with_state(metrics_handle),
        )
        .layer(from_fn(metrics::track_metrics))
        .layer(from_fn(request_id::request_id_middleware))
        .layer(cors::create_cors_layer(config.allowed_origins.clone()));
    let app = security_headers::apply_security_headers(app, config.env);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on http://{addr}");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
