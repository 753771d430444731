/// Request logging middleware and metrics counters
///
/// Emits one structured JSON log line per request (method, path, status,
/// latency, user id when a bearer token parses) and feeds the in-memory
/// metrics registry exposed at `GET /metrics`.
///
/// The user id here is best-effort observability only — it is decoded
/// without touching the database and grants nothing; authentication is
/// enforced separately by the auth layer.
///
/// # Log Format
///
/// ```json
/// {"level":"INFO","fields":{"message":"request","method":"GET","path":"/tasks",
///  "status_code":200,"latency_ms":3.21,"user_id":"..."}}
/// ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use sprintsync_shared::auth::jwt::validate_token;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use crate::app::AppState;

/// In-memory Prometheus-style counters
///
/// Counters are process-local and reset on restart; they exist for quick
/// operational checks, not long-term storage.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    requests_total: AtomicU64,
    requests_by_status: Mutex<BTreeMap<u16, u64>>,
    latency_ms_total: Mutex<f64>,
}

impl MetricsRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed request
    pub fn record_request(&self, status_code: u16, latency_ms: f64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        let mut by_status = self
            .requests_by_status
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *by_status.entry(status_code).or_insert(0) += 1;

        let mut latency = self
            .latency_ms_total
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *latency += latency_ms;
    }

    /// Returns a JSON snapshot of all counters
    pub fn snapshot(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();

        out.insert(
            "requests_total".to_string(),
            json!(self.requests_total.load(Ordering::Relaxed)),
        );

        let by_status = self
            .requests_by_status
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        for (status, count) in by_status.iter() {
            out.insert(format!("requests_by_status_{}", status), json!(count));
        }

        let latency = self
            .latency_ms_total
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        out.insert(
            "latency_ms_total".to_string(),
            json!((*latency * 100.0).round() / 100.0),
        );

        serde_json::Value::Object(out)
    }
}

/// Request logging middleware
///
/// Wraps every request: measures latency, records metrics, and logs one
/// structured event after the response is produced.
pub async fn request_log_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    // Best-effort user id for the log line; invalid tokens are simply
    // logged as anonymous
    let user_id = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| validate_token(token, &state.config.jwt.secret).ok())
        .map(|claims| claims.sub);

    let response = next.run(req).await;

    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    let status_code = response.status().as_u16();

    state.metrics.record_request(status_code, latency_ms);

    let user_id = user_id.map(|id| id.to_string());
    tracing::info!(
        method = %method,
        path = %path,
        status_code,
        latency_ms = (latency_ms * 100.0).round() / 100.0,
        user_id = user_id.as_deref(),
        "request"
    );

    response
}
