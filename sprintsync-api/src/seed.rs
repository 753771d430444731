/// Development seed data
///
/// Populates a fresh database with demo users and tasks so the board has
/// something on it after the first start. Seeding is idempotent: it is
/// skipped entirely once any user exists.
///
/// # Demo Accounts
///
/// - `admin` / `admin123` (admin)
/// - `alice` / `alice123`
/// - `bob` / `bob123`

use sprintsync_shared::{
    auth::password::hash_password,
    models::{
        task::{CreateTask, Task, TaskStatus},
        user::{CreateUser, User},
    },
};
use sqlx::PgPool;
use tracing::info;

/// Seeds the database with demo data
///
/// # Errors
///
/// Returns an error if hashing or any insert fails; the caller decides
/// whether a failed seed is fatal (in development it is logged and
/// ignored).
pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    if User::count(pool).await? > 0 {
        info!("Database already seeded, skipping");
        return Ok(());
    }

    let admin = User::create(
        pool,
        CreateUser {
            email: "admin@sprintsync.dev".to_string(),
            username: "admin".to_string(),
            password_hash: hash_password("admin123")?,
            is_admin: true,
        },
    )
    .await?;

    let alice = User::create(
        pool,
        CreateUser {
            email: "alice@sprintsync.dev".to_string(),
            username: "alice".to_string(),
            password_hash: hash_password("alice123")?,
            is_admin: false,
        },
    )
    .await?;

    let bob = User::create(
        pool,
        CreateUser {
            email: "bob@sprintsync.dev".to_string(),
            username: "bob".to_string(),
            password_hash: hash_password("bob123")?,
            is_admin: false,
        },
    )
    .await?;

    let demo_tasks = [
        (
            "Set up CI pipeline",
            "Configure GitHub Actions for lint, test, and Docker build on every push.",
            TaskStatus::Done,
            90,
            alice.id,
        ),
        (
            "Design auth system",
            "Implement JWT-based authentication for the API.",
            TaskStatus::Done,
            120,
            alice.id,
        ),
        (
            "Build task CRUD API",
            "Endpoints for full task lifecycle management.",
            TaskStatus::InProgress,
            60,
            alice.id,
        ),
        (
            "Add AI suggest endpoint",
            "Generate task descriptions and daily plans with a model fallback.",
            TaskStatus::Review,
            45,
            alice.id,
        ),
        (
            "Write integration tests",
            "Cover the suggest stub and core CRUD flows.",
            TaskStatus::Backlog,
            0,
            alice.id,
        ),
        (
            "Database schema design",
            "Define relational schema for users and tasks with migrations.",
            TaskStatus::Done,
            45,
            bob.id,
        ),
        (
            "Frontend SPA scaffold",
            "React app with task list, auth, and API integration.",
            TaskStatus::InProgress,
            75,
            bob.id,
        ),
        (
            "Observability middleware",
            "Add structured JSON logging and metrics counters.",
            TaskStatus::Backlog,
            0,
            bob.id,
        ),
        (
            "Docker + compose setup",
            "Containerize app and DB, ensure dev parity with production.",
            TaskStatus::Backlog,
            0,
            bob.id,
        ),
    ];

    for (title, description, status, total_minutes, owner_id) in demo_tasks {
        Task::create(
            pool,
            CreateTask {
                title: title.to_string(),
                description: description.to_string(),
                status,
                total_minutes,
                owner_id,
            },
        )
        .await?;
    }

    info!(
        admin = %admin.username,
        "Database seeded with demo users and tasks"
    );

    Ok(())
}
