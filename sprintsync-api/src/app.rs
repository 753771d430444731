/// Application state and router builder
///
/// This module defines the shared application state and provides a
/// function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use sprintsync_api::app::{build_router, AppState};
/// use sprintsync_api::config::Config;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    ai::SuggestionEngine,
    config::Config,
    error::ApiError,
    middleware::request_log::{request_log_layer, MetricsRegistry},
};
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use sprintsync_shared::auth::middleware::{authenticate, extract_bearer_token};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// AI suggestion engine (live model or deterministic stub)
    pub ai: Arc<SuggestionEngine>,

    /// In-memory request metrics
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let ai = SuggestionEngine::from_config(&config.ai);

        Self {
            db,
            config: Arc::new(config),
            ai: Arc::new(ai),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                    # Health check (public)
/// ├── /metrics                   # Counter snapshot (public)
/// ├── /auth/                     # Authentication (public)
/// │   ├── POST /register
/// │   └── POST /token
/// ├── /users/                    # User management (authenticated)
/// ├── /tasks/                    # Task CRUD + workflow (authenticated)
/// ├── /ai/suggest                # AI suggestions (authenticated)
/// └── /stats/                    # Aggregates (authenticated)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Request logging + metrics
/// 2. Tracing (tower-http TraceLayer)
/// 3. CORS
/// 4. Authentication (per-route-group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public observability endpoints
    let health_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/token", post(routes::auth::login));

    // User routes (require authentication)
    let user_routes = Router::new()
        .route("/me", get(routes::users::get_me))
        .route("/", get(routes::users::list_users))
        .route("/:id", get(routes::users::get_user))
        .route("/:id", patch(routes::users::update_user))
        .route("/:id", delete(routes::users::delete_user));

    // Task routes (require authentication)
    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/", post(routes::tasks::create_task))
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", patch(routes::tasks::update_task))
        .route("/:id/transition", post(routes::tasks::transition_task))
        .route("/:id", delete(routes::tasks::delete_task));

    // AI routes (require authentication)
    let ai_routes = Router::new().route("/suggest", post(routes::ai::suggest));

    // Stats routes (require authentication)
    let stats_routes = Router::new()
        .route("/top-users", get(routes::stats::top_users))
        .route("/cycle-time", get(routes::stats::cycle_time));

    let authenticated = Router::new()
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .nest("/ai", ai_routes)
        .nest("/stats", stats_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .merge(authenticated)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            request_log_layer,
        ))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts the bearer token, validates it, resolves the acting user from
/// the database, and injects an `AuthContext` into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(req.headers())?.to_string();

    let auth_context = authenticate(&state.db, state.jwt_secret(), &token).await?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    // AppState construction and the full router are exercised end-to-end
    // by tests/integration_test.rs against a live database.
}
