/// Task CRUD and workflow endpoints
///
/// # Endpoints
///
/// - `GET /tasks` - List tasks (owner-scoped; admins see all)
/// - `POST /tasks` - Create a task
/// - `GET /tasks/:id` - Read a task
/// - `PATCH /tasks/:id` - Partial field update
/// - `POST /tasks/:id/transition` - Move a task through the workflow
/// - `DELETE /tasks/:id` - Delete a task
///
/// # Authorization
///
/// Every per-task operation follows the same shape: look the task up
/// (404 when absent), consult the ownership policy (403 when denied),
/// then act. Listing never errors — it is scoped in the query instead.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprintsync_shared::{
    auth::{
        authorization::{require_task_access, require_task_create},
        middleware::AuthContext,
    },
    models::{
        task::{CreateTask, InvalidTransition, Task, TaskStatus, UpdateTask},
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Public view of a task
#[derive(Debug, Serialize)]
pub struct TaskOut {
    /// Task ID
    pub id: Uuid,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Current workflow status
    pub status: TaskStatus,

    /// Minutes logged
    pub total_minutes: i32,

    /// Owning user
    pub owner_id: Uuid,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last-update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskOut {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            total_minutes: task.total_minutes,
            owner_id: task.owner_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Task description
    #[serde(default)]
    pub description: String,

    /// Initial status; applied directly, creation is not a transition
    #[serde(default = "default_status")]
    pub status: TaskStatus,

    /// Minutes already logged
    #[serde(default)]
    #[validate(range(min = 0, message = "total_minutes must not be negative"))]
    pub total_minutes: i32,

    /// Owner; defaults to the acting user. Only admins may set another
    /// user's id here.
    pub owner_id: Option<Uuid>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Backlog
}

/// Partial task update request
///
/// An absent field is left untouched; a present field is applied even
/// when it carries an "empty" value (e.g. clearing the description).
/// Status and owner are not updatable here — status moves through
/// `POST /tasks/:id/transition` only.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title (must stay non-empty)
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description (may be empty)
    pub description: Option<String>,

    /// New logged-minutes total
    #[validate(range(min = 0, message = "total_minutes must not be negative"))]
    pub total_minutes: Option<i32>,
}

/// Workflow transition request
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    /// Requested target status
    pub new_status: TaskStatus,
}

/// Lists tasks visible to the actor
///
/// Admins see every task; everyone else sees only tasks they own. An
/// empty list is a valid result, never an error.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskOut>>> {
    let tasks = if auth.is_admin {
        Task::list_all(&state.db).await?
    } else {
        Task::list_by_owner(&state.db, auth.user_id).await?
    };

    Ok(Json(tasks.into_iter().map(TaskOut::from).collect()))
}

/// Creates a task
///
/// The effective owner is the explicit `owner_id` or the acting user.
/// Non-admins may only create tasks for themselves.
///
/// # Errors
///
/// - `403 Forbidden`: Non-admin setting a foreign owner
/// - `404 Not Found`: Explicit owner does not exist
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskOut>)> {
    req.validate()?;

    let owner_id = req.owner_id.unwrap_or(auth.user_id);
    require_task_create(&auth, owner_id)?;

    // The acting user exists by construction; an explicit foreign owner
    // must be checked before we hand the id to the insert
    if owner_id != auth.user_id {
        User::find_by_id(&state.db, owner_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Owner user not found".to_string()))?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            total_minutes: req.total_minutes,
            owner_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(TaskOut::from(task))))
}

/// Reads a single task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskOut>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_task_access(&auth, task.owner_id)?;

    Ok(Json(TaskOut::from(task)))
}

/// Applies a partial update to a task
///
/// Only fields present in the payload are written; `updated_at` is
/// refreshed even by an empty payload.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskOut>> {
    req.validate()?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_task_access(&auth, task.owner_id)?;

    let updated = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            title: req.title,
            description: req.description,
            total_minutes: req.total_minutes,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskOut::from(updated)))
}

/// Moves a task to a new status
///
/// The requested status must be reachable from the current one in the
/// workflow; otherwise the request fails with the current status and the
/// full allowed set in the error payload.
///
/// # Errors
///
/// - `400 Bad Request`: Illegal transition (payload carries `current` and
///   `allowed`)
/// - `403 Forbidden` / `404 Not Found`: as for `GET /tasks/:id`
pub async fn transition_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<TransitionRequest>,
) -> ApiResult<Json<TaskOut>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_task_access(&auth, task.owner_id)?;

    if !task.status.can_transition_to(req.new_status) {
        return Err(InvalidTransition {
            from: task.status,
            to: req.new_status,
            allowed: task.status.allowed_transitions(),
        }
        .into());
    }

    // The UPDATE is guarded on the status we validated against; a
    // concurrent transition makes it match zero rows, in which case the
    // task is re-read and the request judged against the fresh status
    match Task::transition(&state.db, task_id, task.status, req.new_status).await? {
        Some(updated) => Ok(Json(TaskOut::from(updated))),
        None => {
            let current = Task::find_by_id(&state.db, task_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

            Err(InvalidTransition {
                from: current.status,
                to: req.new_status,
                allowed: current.status.allowed_transitions(),
            }
            .into())
        }
    }
}

/// Deletes a task permanently
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_task_access(&auth, task.owner_id)?;

    Task::delete(&state.db, task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_request_validation() {
        let valid = CreateTaskRequest {
            title: "Build task CRUD API".to_string(),
            description: String::new(),
            status: TaskStatus::Backlog,
            total_minutes: 0,
            owner_id: None,
        };
        assert!(valid.validate().is_ok());

        let empty_title = CreateTaskRequest {
            title: "".to_string(),
            description: String::new(),
            status: TaskStatus::Backlog,
            total_minutes: 0,
            owner_id: None,
        };
        assert!(empty_title.validate().is_err());

        let negative_minutes = CreateTaskRequest {
            title: "t".to_string(),
            description: String::new(),
            status: TaskStatus::Backlog,
            total_minutes: -5,
            owner_id: None,
        };
        assert!(negative_minutes.validate().is_err());
    }

    #[test]
    fn test_create_task_request_defaults() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"title": "Feature X"}"#).unwrap();
        assert_eq!(req.status, TaskStatus::Backlog);
        assert_eq!(req.total_minutes, 0);
        assert_eq!(req.description, "");
        assert!(req.owner_id.is_none());
    }

    #[test]
    fn test_unknown_status_rejected_at_the_boundary() {
        let result =
            serde_json::from_str::<TransitionRequest>(r#"{"new_status": "cancelled"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_request_empty_values_are_present() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"description": ""}"#).unwrap();
        // Empty description is Some("") and will be applied; it is not
        // conflated with an absent field
        assert_eq!(req.description.as_deref(), Some(""));
        assert!(req.title.is_none());
        assert!(req.validate().is_ok());

        // An empty title, however, violates the non-empty invariant
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
