/// AI suggestion endpoint
///
/// # Endpoints
///
/// - `POST /ai/suggest?mode=description&title=...` - Draft a task
///   description from a short title
/// - `POST /ai/suggest?mode=daily_plan` - A concise daily plan built from
///   the signed-in user's tasks
///
/// Responses always succeed: when no live model is available or the call
/// fails, the deterministic stub is returned with a `source` marker of
/// `stub` or `model-fallback`.

use crate::{
    ai::TaskSummary,
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use sprintsync_shared::{
    auth::middleware::AuthContext,
    models::{task::Task, user::User},
};

/// Suggestion mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestMode {
    /// Draft a task description from a title
    Description,

    /// Build a daily plan from the user's tasks
    DailyPlan,
}

/// Query parameters for `POST /ai/suggest`
#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    /// Suggestion mode (default: description)
    pub mode: Option<SuggestMode>,

    /// Task title (required for mode=description)
    pub title: Option<String>,
}

/// AI suggestion handler
///
/// # Errors
///
/// - `400 Bad Request`: mode=description without a title
pub async fn suggest(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<SuggestParams>,
) -> ApiResult<Json<serde_json::Value>> {
    match params.mode.unwrap_or(SuggestMode::Description) {
        SuggestMode::Description => {
            let title = params
                .title
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    ApiError::BadRequest("title is required for mode=description".to_string())
                })?;

            let suggestion = state.ai.suggest_description(&title).await;
            Ok(Json(serde_json::to_value(suggestion).map_err(|e| {
                ApiError::InternalError(format!("Serialization failed: {}", e))
            })?))
        }
        SuggestMode::DailyPlan => {
            let user = User::find_by_id(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

            let tasks = Task::list_by_owner(&state.db, auth.user_id).await?;
            let summaries: Vec<TaskSummary> = tasks
                .into_iter()
                .map(|t| TaskSummary {
                    title: t.title,
                    status: t.status,
                    total_minutes: t.total_minutes,
                })
                .collect();

            let plan = state.ai.suggest_daily_plan(&user.username, &summaries).await;
            Ok(Json(serde_json::to_value(plan).map_err(|e| {
                ApiError::InternalError(format!("Serialization failed: {}", e))
            })?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_wire_format() {
        let params: SuggestParams =
            serde_json::from_str(r#"{"mode": "daily_plan", "title": null}"#).unwrap();
        assert_eq!(params.mode, Some(SuggestMode::DailyPlan));

        let params: SuggestParams = serde_json::from_str(r#"{"mode": "description"}"#).unwrap();
        assert_eq!(params.mode, Some(SuggestMode::Description));

        assert!(serde_json::from_str::<SuggestParams>(r#"{"mode": "poetry"}"#).is_err());
    }
}
