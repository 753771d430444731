//! # SprintSync API Server
//!
//! Lean internal tool for engineers: log work, track time, and get
//! AI-powered planning help.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - JWT authentication (register/login)
//! - Task CRUD with a fixed workflow state machine
//! - Ownership/admin authorization on every operation
//! - AI task descriptions and daily plans with a deterministic stub fallback
//! - Structured JSON request logging and in-memory metrics
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/sprintsync \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p sprintsync-api
//! ```

use sprintsync_api::{
    app::{build_router, AppState},
    config::Config,
    seed,
};
use sprintsync_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured JSON logs to stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sprintsync_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!(
        "SprintSync API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    // Auto-seed in development; a failed seed is not fatal
    if let Err(e) = seed::seed(&db).await {
        tracing::warn!(reason = %e, "Seed skipped");
    }

    let bind_address = config.bind_address();
    let state = AppState::new(db, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
