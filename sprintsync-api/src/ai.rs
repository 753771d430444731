/// AI suggestion engine: live model call with deterministic stub fallback
///
/// This module generates task descriptions and daily plans. The engine is
/// an explicit capability injected into the application state at
/// construction time — its availability is a visible [`ModelState`], not
/// an implicit null check buried in a call site.
///
/// # Fallback Contract
///
/// A generation failure never fails the surrounding request. Every
/// response carries a `source` marker:
///
/// - `stub`: no live capability (no API key, or the stub was forced)
/// - `model`: the hosted model produced the content
/// - `model-fallback`: the live call failed and the deterministic stub
///   was substituted
///
/// # Example
///
/// ```
/// use sprintsync_api::ai::{ModelState, SuggestionEngine, SuggestionSource};
/// use sprintsync_api::config::AiConfig;
///
/// # async fn example() {
/// let engine = SuggestionEngine::from_config(&AiConfig {
///     api_key: None,
///     force_stub: false,
///     base_url: "https://api.openai.com/v1".to_string(),
///     model: "gpt-4o-mini".to_string(),
/// });
///
/// assert_eq!(engine.state(), ModelState::Unloaded);
/// let suggestion = engine.suggest_description("Fix login bug").await;
/// assert_eq!(suggestion.source, SuggestionSource::Stub);
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sprintsync_shared::models::task::TaskStatus;
use std::sync::RwLock;
use std::time::Duration;

use crate::config::AiConfig;

/// Deterministic description used when no live model is available
const STUB_DESCRIPTION: &str = "This task involves researching, planning, and implementing the \
    core feature. Break it down into subtasks: (1) gather requirements, (2) design the approach, \
    (3) implement incrementally, (4) write tests, (5) review and iterate.";

/// Deterministic daily plan used when no live model is available
fn stub_plan_items() -> Vec<PlanItem> {
    [
        ("09:00", "Review backlog and pick top 3 tasks"),
        ("09:30", "Deep work block on the highest-priority task"),
        ("12:00", "Lunch and async comms"),
        ("13:00", "Continue top-priority task or start the second task"),
        ("15:30", "Code review and unblocking teammates"),
        ("16:30", "Wrap up, update task statuses, log time"),
        ("17:00", "Plan tomorrow"),
    ]
    .iter()
    .map(|(time, activity)| PlanItem {
        time: time.to_string(),
        activity: activity.to_string(),
    })
    .collect()
}

/// Availability of the live generation capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelState {
    /// No API key configured, or the stub was forced; stub-only operation
    Unloaded,

    /// Live calls are attempted
    Ready,

    /// The last live call failed; calls are still attempted, but the
    /// degraded state is visible to operators
    Failed,
}

/// Where a suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionSource {
    /// Deterministic stub (no live capability)
    #[serde(rename = "stub")]
    Stub,

    /// Hosted model response
    #[serde(rename = "model")]
    Model,

    /// Live call failed, stub substituted
    #[serde(rename = "model-fallback")]
    ModelFallback,
}

/// A generated task description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// The title the description was generated for
    pub title: String,

    /// Generated description text
    pub description: String,

    /// Where the content came from
    pub source: SuggestionSource,
}

/// One entry of a daily plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanItem {
    /// Start time, HH:MM
    pub time: String,

    /// What to do
    pub activity: String,
}

/// A generated daily plan for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPlan {
    /// Username the plan was generated for
    pub user: String,

    /// Ordered plan entries
    pub plan: Vec<PlanItem>,

    /// Where the content came from
    pub source: SuggestionSource,
}

/// Compact task view handed to the model when building a daily plan
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    /// Task title
    pub title: String,

    /// Current workflow status
    pub status: TaskStatus,

    /// Minutes logged
    pub total_minutes: i32,
}

/// Chat-completions request/response shapes (OpenAI-compatible)
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// AI suggestion engine
///
/// Constructed once at startup from [`AiConfig`] and shared via the
/// application state. Task CRUD never depends on this engine.
pub struct SuggestionEngine {
    state: RwLock<ModelState>,
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl SuggestionEngine {
    /// Builds the engine from configuration
    ///
    /// The engine starts `Ready` when an API key is present and the stub
    /// is not forced, `Unloaded` otherwise.
    pub fn from_config(config: &AiConfig) -> Self {
        let live = config.api_key.is_some() && !config.force_stub;

        Self {
            state: RwLock::new(if live {
                ModelState::Ready
            } else {
                ModelState::Unloaded
            }),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_key: if config.force_stub {
                None
            } else {
                config.api_key.clone()
            },
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// Current capability state
    pub fn state(&self) -> ModelState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn mark(&self, state: ModelState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }

    fn is_live(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generates a task description from a short title
    ///
    /// Never fails: any generation error degrades to the stub with
    /// `source: "model-fallback"`.
    pub async fn suggest_description(&self, title: &str) -> Suggestion {
        if !self.is_live() {
            return Suggestion {
                title: title.to_string(),
                description: format!("[STUB] {}", STUB_DESCRIPTION),
                source: SuggestionSource::Stub,
            };
        }

        let system = "You are a helpful engineering project manager. Given a short task title, \
            write a clear, concise task description (2-4 sentences) that explains what needs to \
            be done and why it matters. Be specific and actionable.";

        match self
            .chat(system, &format!("Task title: {}", title), 200, 0.7)
            .await
        {
            Ok(description) => {
                self.mark(ModelState::Ready);
                Suggestion {
                    title: title.to_string(),
                    description,
                    source: SuggestionSource::Model,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "AI description generation failed, using stub");
                self.mark(ModelState::Failed);
                Suggestion {
                    title: title.to_string(),
                    description: STUB_DESCRIPTION.to_string(),
                    source: SuggestionSource::ModelFallback,
                }
            }
        }
    }

    /// Generates a concise daily plan for a user from their current tasks
    ///
    /// Never fails: any generation error degrades to the stub plan with
    /// `source: "model-fallback"`.
    pub async fn suggest_daily_plan(&self, username: &str, tasks: &[TaskSummary]) -> DailyPlan {
        if !self.is_live() {
            return DailyPlan {
                user: username.to_string(),
                plan: stub_plan_items(),
                source: SuggestionSource::Stub,
            };
        }

        let system = "You are an expert engineering coach. Given a user's current tasks, produce \
            a concise daily schedule in JSON with a 'plan' array of objects with 'time' (HH:MM) \
            and 'activity' fields. Max 8 items. Respond ONLY with valid JSON.";

        let task_summary = serde_json::to_string_pretty(tasks).unwrap_or_else(|_| "[]".to_string());
        let prompt = format!("User: {}\nTasks:\n{}", username, task_summary);

        match self.chat(system, &prompt, 400, 0.5).await {
            Ok(content) => match parse_plan(&content) {
                Some(plan) => {
                    self.mark(ModelState::Ready);
                    DailyPlan {
                        user: username.to_string(),
                        plan,
                        source: SuggestionSource::Model,
                    }
                }
                None => {
                    tracing::warn!("AI plan response was not valid plan JSON, using stub");
                    self.mark(ModelState::Failed);
                    DailyPlan {
                        user: username.to_string(),
                        plan: stub_plan_items(),
                        source: SuggestionSource::ModelFallback,
                    }
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "AI plan generation failed, using stub");
                self.mark(ModelState::Failed);
                DailyPlan {
                    user: username.to_string(),
                    plan: stub_plan_items(),
                    source: SuggestionSource::ModelFallback,
                }
            }
        }
    }

    /// Single chat-completions round trip, returning the response text
    async fn chat(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, reqwest::Error> {
        let api_key = self.api_key.as_deref().unwrap_or_default();

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens,
            temperature,
        };

        let response: ChatResponse = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default())
    }
}

/// Parses the model's plan JSON, tolerating a bare array or a {"plan": []}
/// wrapper
fn parse_plan(content: &str) -> Option<Vec<PlanItem>> {
    #[derive(Deserialize)]
    struct PlanWrapper {
        plan: Vec<PlanItem>,
    }

    if let Ok(wrapper) = serde_json::from_str::<PlanWrapper>(content) {
        return Some(wrapper.plan);
    }

    serde_json::from_str::<Vec<PlanItem>>(content).ok()
}
