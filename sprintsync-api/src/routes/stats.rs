/// Cross-task aggregate endpoints
///
/// # Endpoints
///
/// - `GET /stats/top-users?limit=N` - Users ranked by minutes logged on
///   their tasks
/// - `GET /stats/cycle-time` - Average minutes and task count per status
///
/// Both are available to any authenticated user.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sprintsync_shared::{auth::middleware::AuthContext, models::task::TaskStatus};
use uuid::Uuid;

/// Query parameters for `GET /stats/top-users`
#[derive(Debug, Deserialize)]
pub struct TopUsersParams {
    /// Maximum number of users to return (default: 5)
    pub limit: Option<i64>,
}

/// One row of the top-users ranking
#[derive(Debug, Serialize)]
pub struct TopUser {
    /// User ID
    pub user_id: Uuid,

    /// Login name
    pub username: String,

    /// Minutes summed over all owned tasks
    pub total_minutes: i64,
}

/// One row of the per-status aggregate
#[derive(Debug, Serialize)]
pub struct CycleTime {
    /// Workflow status
    pub status: TaskStatus,

    /// Average minutes logged per task in this status, rounded to one
    /// decimal place
    pub avg_minutes: f64,

    /// Number of tasks in this status
    pub count: i64,
}

/// Top users by total minutes logged on their tasks
pub async fn top_users(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Query(params): Query<TopUsersParams>,
) -> ApiResult<Json<Vec<TopUser>>> {
    let limit = params.limit.unwrap_or(5).clamp(1, 100);

    let rows: Vec<(Uuid, String, i64)> = sqlx::query_as(
        r#"
        SELECT u.id, u.username, COALESCE(SUM(t.total_minutes), 0)::BIGINT AS total_minutes
        FROM users u
        JOIN tasks t ON t.owner_id = u.id
        GROUP BY u.id, u.username
        ORDER BY SUM(t.total_minutes) DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&state.db)
    .await?;

    let out = rows
        .into_iter()
        .map(|(user_id, username, total_minutes)| TopUser {
            user_id,
            username,
            total_minutes,
        })
        .collect();

    Ok(Json(out))
}

/// Average minutes and task count per workflow status
pub async fn cycle_time(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<CycleTime>>> {
    let rows: Vec<(TaskStatus, Option<f64>, i64)> = sqlx::query_as(
        r#"
        SELECT status, AVG(total_minutes)::DOUBLE PRECISION AS avg_minutes, COUNT(*) AS count
        FROM tasks
        GROUP BY status
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let out = rows
        .into_iter()
        .map(|(status, avg_minutes, count)| CycleTime {
            status,
            avg_minutes: (avg_minutes.unwrap_or(0.0) * 10.0).round() / 10.0,
            count,
        })
        .collect();

    Ok(Json(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_users_default_limit() {
        let params: TopUsersParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit.unwrap_or(5), 5);
    }
}
