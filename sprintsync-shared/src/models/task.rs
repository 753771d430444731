/// Task model and database operations
///
/// This module provides the Task model, the core entity of SprintSync, plus
/// the status workflow that governs how a task moves through the board.
///
/// # State Machine
///
/// ```text
/// backlog → in_progress → review → done
///              ↑   ↓         ↓
///              backlog    in_progress
/// ```
///
/// `backlog` is the initial status of every new task, `done` is terminal.
/// The allowed transitions are a compile-time constant; requesting any other
/// target (including the current status itself) is an [`InvalidTransition`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('backlog', 'in_progress', 'review', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'backlog',
///     total_minutes INTEGER NOT NULL DEFAULT 0 CHECK (total_minutes >= 0),
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use sprintsync_shared::models::task::{CreateTask, Task, TaskStatus};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let task = Task::create(&pool, CreateTask {
///     title: "Build task CRUD API".to_string(),
///     description: String::new(),
///     status: TaskStatus::Backlog,
///     total_minutes: 0,
///     owner_id,
/// }).await?;
///
/// // Move it onto the board
/// assert!(task.status.can_transition_to(TaskStatus::InProgress));
/// Task::transition(&pool, task.id, task.status, TaskStatus::InProgress).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet started; the initial status of every new task
    Backlog,

    /// Actively being worked on
    InProgress,

    /// Work finished, awaiting review
    Review,

    /// Accepted and closed; terminal
    Done,
}

impl TaskStatus {
    /// Converts status to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "backlog",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    /// Returns the statuses reachable from this one.
    ///
    /// The table is a read-only constant; a task may only move along these
    /// edges, one step per request.
    pub fn allowed_transitions(&self) -> &'static [TaskStatus] {
        match self {
            TaskStatus::Backlog => &[TaskStatus::InProgress],
            TaskStatus::InProgress => &[TaskStatus::Review, TaskStatus::Backlog],
            TaskStatus::Review => &[TaskStatus::Done, TaskStatus::InProgress],
            TaskStatus::Done => &[],
        }
    }

    /// Checks if transition to the target status is valid.
    ///
    /// Pure table lookup, no I/O. A no-op transition (`target == self`) is
    /// not in any adjacency set and is therefore rejected like any other
    /// disallowed target.
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// Checks if status is terminal (no outgoing transitions)
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a requested status change is not in the workflow.
///
/// Carries the offending current status and the full allowed set so the
/// caller can report it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    /// Status the task was in when the transition was requested
    pub from: TaskStatus,

    /// Requested target status
    pub to: TaskStatus,

    /// Statuses that were actually reachable from `from`
    pub allowed: &'static [TaskStatus],
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allowed: Vec<&str> = self.allowed.iter().map(TaskStatus::as_str).collect();
        write!(
            f,
            "cannot transition from '{}' to '{}' (allowed: [{}])",
            self.from,
            self.to,
            allowed.join(", ")
        )
    }
}

impl std::error::Error for InvalidTransition {}

/// Task model representing a unit of work owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short human-readable title (non-empty)
    pub title: String,

    /// Longer free-form description (may be empty)
    pub description: String,

    /// Current workflow status
    pub status: TaskStatus,

    /// Minutes of work logged against this task (never negative)
    pub total_minutes: i32,

    /// User who owns this task
    pub owner_id: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Task description (may be empty)
    pub description: String,

    /// Initial status; set directly, not routed through the workflow
    pub status: TaskStatus,

    /// Minutes already logged
    pub total_minutes: i32,

    /// Owning user
    pub owner_id: Uuid,
}

/// Input for a partial task update.
///
/// Only fields that are `Some` are written; an absent field leaves the
/// stored value untouched, while a present-but-empty value (e.g. an empty
/// description) is still applied. Status and owner are deliberately not
/// representable here — status changes go through [`Task::transition`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New logged-minutes total
    pub total_minutes: Option<i32>,
}

impl UpdateTask {
    /// True when no field is present (the update would only touch `updated_at`)
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.total_minutes.is_none()
    }
}

impl Task {
    /// Creates a new task
    ///
    /// The supplied status is written as-is; creation is not a workflow
    /// transition.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner does not exist (foreign key violation)
    /// or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, total_minutes, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, status, total_minutes, owner_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.total_minutes)
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, total_minutes, owner_id,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists every task, newest first (admin view)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, total_minutes, owner_id,
                   created_at, updated_at
            FROM tasks
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks owned by a single user, newest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, total_minutes, owner_id,
                   created_at, updated_at
            FROM tasks
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a partial update to a task.
    ///
    /// Only fields present in `data` are written; `updated_at` is always
    /// refreshed, even for an empty payload.
    ///
    /// # Returns
    ///
    /// The updated task, or `None` if no task with that id exists
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build the update statement from whichever fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.total_minutes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", total_minutes = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, status, total_minutes, owner_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(total_minutes) = data.total_minutes {
            q = q.bind(total_minutes);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Moves a task to a new status.
    ///
    /// The update is guarded on the expected current status, so the change
    /// is all-or-nothing: if a concurrent writer moved the task first, no
    /// row matches and `None` is returned — the caller should re-read and
    /// re-evaluate against the fresh status.
    ///
    /// Workflow legality is the caller's responsibility (check
    /// [`TaskStatus::can_transition_to`] first); this method only applies
    /// the already-validated change and refreshes `updated_at`.
    pub async fn transition(
        pool: &PgPool,
        id: Uuid,
        from: TaskStatus,
        to: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = $3
            RETURNING id, title, description, status, total_minutes, owner_id,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(to)
        .bind(from)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task permanently
    ///
    /// # Returns
    ///
    /// True if a task was deleted, false if none existed with that id
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts tasks owned by a user
    pub async fn count_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [TaskStatus; 4] = [
        TaskStatus::Backlog,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Backlog.as_str(), "backlog");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::Review.as_str(), "review");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_task_status_serde_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let parsed: TaskStatus = serde_json::from_str("\"review\"").unwrap();
        assert_eq!(parsed, TaskStatus::Review);

        // Unknown values never reach the workflow engine
        assert!(serde_json::from_str::<TaskStatus>("\"archived\"").is_err());
    }

    #[test]
    fn test_transition_table_is_exact() {
        assert_eq!(
            TaskStatus::Backlog.allowed_transitions(),
            &[TaskStatus::InProgress]
        );
        assert_eq!(
            TaskStatus::InProgress.allowed_transitions(),
            &[TaskStatus::Review, TaskStatus::Backlog]
        );
        assert_eq!(
            TaskStatus::Review.allowed_transitions(),
            &[TaskStatus::Done, TaskStatus::InProgress]
        );
        assert!(TaskStatus::Done.allowed_transitions().is_empty());
    }

    #[test]
    fn test_no_op_transitions_are_illegal() {
        for status in ALL_STATUSES {
            assert!(
                !status.can_transition_to(status),
                "{} → {} should be rejected",
                status,
                status
            );
        }
    }

    #[test]
    fn test_done_is_the_only_terminal_status() {
        assert!(TaskStatus::Done.is_terminal());
        assert!(!TaskStatus::Backlog.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(!TaskStatus::Review.is_terminal());
    }

    #[test]
    fn test_disallowed_edges_rejected() {
        assert!(!TaskStatus::Backlog.can_transition_to(TaskStatus::Review));
        assert!(!TaskStatus::Backlog.can_transition_to(TaskStatus::Done));
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::Done));
        assert!(!TaskStatus::Review.can_transition_to(TaskStatus::Backlog));
        for status in ALL_STATUSES {
            assert!(!TaskStatus::Done.can_transition_to(status));
        }
    }

    #[test]
    fn test_allowed_edges_accepted() {
        assert!(TaskStatus::Backlog.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Review));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Backlog));
        assert!(TaskStatus::Review.can_transition_to(TaskStatus::Done));
        assert!(TaskStatus::Review.can_transition_to(TaskStatus::InProgress));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = InvalidTransition {
            from: TaskStatus::InProgress,
            to: TaskStatus::Done,
            allowed: TaskStatus::InProgress.allowed_transitions(),
        };
        assert_eq!(
            err.to_string(),
            "cannot transition from 'in_progress' to 'done' (allowed: [review, backlog])"
        );
    }

    #[test]
    fn test_update_task_is_empty() {
        assert!(UpdateTask::default().is_empty());
        assert!(!UpdateTask {
            total_minutes: Some(90),
            ..Default::default()
        }
        .is_empty());
    }

    // Database-backed tests for CRUD and the guarded transition UPDATE are
    // in sprintsync-api/tests/integration_test.rs.
}
