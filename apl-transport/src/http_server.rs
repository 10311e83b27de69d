//! Hosts a [`PolicyServer`] over HTTP via `axum`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use apl_composition::{CompositionStrategy, DenyOverridesStrategy};
use apl_policy::PolicyServer;
use apl_types::Event;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::sse::{Event as SseEvent, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use futures::stream::Stream;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

struct AppState {
    server: PolicyServer,
    started_at: Instant,
    requests_total: AtomicU64,
    errors_total: AtomicU64,
    latency_ms_sum: Mutex<f64>,
    latency_samples: AtomicU64,
    per_event: Mutex<HashMap<String, u64>>,
    per_decision: Mutex<HashMap<String, u64>>,
}

/// Builds the `axum` router hosting `server`, with CORS and request-id
/// middleware applied in the order the spec lists them. Parse errors are
/// recovered per-handler (a 400 with `{error, detail}`); a handler panic is
/// recovered by [`CatchPanicLayer`], placed innermost so the request-id
/// middleware still observes and attaches its header to the resulting 500
/// instead of the panic unwinding straight past it.
#[must_use]
pub fn router(server: PolicyServer) -> Router {
    let state = Arc::new(AppState {
        server,
        started_at: Instant::now(),
        requests_total: AtomicU64::new(0),
        errors_total: AtomicU64::new(0),
        latency_ms_sum: Mutex::new(0.0),
        latency_samples: AtomicU64::new(0),
        per_event: Mutex::new(HashMap::new()),
        per_decision: Mutex::new(HashMap::new()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            REQUEST_ID_HEADER.parse::<axum::http::HeaderName>().unwrap(),
        ])
        .expose_headers([REQUEST_ID_HEADER.parse::<HeaderValue>().unwrap()])
        .max_age(Duration::from_secs(86_400));

    Router::new()
        .route("/evaluate", axum::routing::post(handle_evaluate))
        .route("/manifest", get(handle_manifest))
        .route("/health", get(handle_health))
        .route("/metrics", get(handle_metrics))
        .route("/events", get(handle_events))
        .fallback(handle_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}

fn handle_panic(payload: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    };
    error!(detail = %detail, "request handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "internal error", "detail": detail}))).into_response()
}

async fn request_id_middleware(
    mut request: axum::extract::Request,
    next: middleware::Next,
) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[derive(Clone)]
struct RequestId(String);

async fn handle_evaluate(
    State(state): State<Arc<AppState>>,
    request: axum::extract::Request,
) -> Response {
    let request_id = request.extensions().get::<RequestId>().cloned().map(|r| r.0);
    let body = match axum::body::to_bytes(request.into_body(), usize::MAX).await {
        Ok(body) => body,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, "failed to read body", &error.to_string(), request_id),
    };

    let event: Event = match parse_event(&body) {
        Ok(event) => event,
        Err(detail) => {
            state.errors_total.fetch_add(1, Ordering::Relaxed);
            return error_response(StatusCode::BAD_REQUEST, "malformed event", &detail, request_id);
        }
    };

    state.requests_total.fetch_add(1, Ordering::Relaxed);
    let start = Instant::now();
    let verdicts = state.server.evaluate(&event).await;
    let evaluation_ms = start.elapsed().as_secs_f64() * 1000.0;

    record_metrics(&state, &event, &verdicts, evaluation_ms).await;

    let composed = DenyOverridesStrategy::default().compose(&verdicts);

    Json(json!({
        "event_id": event.id,
        "verdicts": verdicts,
        "composed_verdict": composed,
        "evaluation_ms": evaluation_ms,
    }))
    .into_response()
}

fn parse_event(body: &Bytes) -> Result<Event, String> {
    serde_json::from_slice(body).map_err(|error| error.to_string())
}

async fn record_metrics(
    state: &AppState,
    event: &Event,
    verdicts: &[apl_types::Verdict],
    evaluation_ms: f64,
) {
    *state.latency_ms_sum.lock().await += evaluation_ms;
    state.latency_samples.fetch_add(1, Ordering::Relaxed);

    *state.per_event.lock().await.entry(event.event_type.to_string()).or_insert(0) += 1;
    let mut per_decision = state.per_decision.lock().await;
    for verdict in verdicts {
        let label = serde_json::to_value(verdict.decision)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_else(|| "unknown".to_owned());
        *per_decision.entry(label).or_insert(0) += 1;
    }
}

fn error_response(status: StatusCode, error: &str, detail: &str, request_id: Option<String>) -> Response {
    let mut response = (status, Json(json!({"error": error, "detail": detail}))).into_response();
    if let Some(request_id) = request_id {
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
    }
    response
}

async fn handle_manifest(State(state): State<Arc<AppState>>) -> Json<apl_types::PolicyManifest> {
    Json(state.server.manifest())
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let manifest = state.server.manifest();
    Json(json!({
        "status": "healthy",
        "server": manifest.server_name,
        "version": manifest.server_version,
        "policies_loaded": manifest.policies.len(),
        "uptime_seconds": state.started_at.elapsed().as_secs_f64(),
        "requests_total": state.requests_total.load(Ordering::Relaxed),
    }))
}

async fn handle_metrics(State(state): State<Arc<AppState>>) -> String {
    let requests_total = state.requests_total.load(Ordering::Relaxed);
    let errors_total = state.errors_total.load(Ordering::Relaxed);
    let samples = state.latency_samples.load(Ordering::Relaxed).max(1);
    let latency_avg = *state.latency_ms_sum.lock().await / samples as f64;
    let uptime = state.started_at.elapsed().as_secs_f64();

    let mut out = String::new();
    out.push_str("# HELP apl_requests_total Total evaluate requests handled.\n");
    out.push_str("# TYPE apl_requests_total counter\n");
    out.push_str(&format!("apl_requests_total {requests_total}\n"));
    out.push_str("# HELP apl_errors_total Total evaluate requests rejected as malformed.\n");
    out.push_str("# TYPE apl_errors_total counter\n");
    out.push_str(&format!("apl_errors_total {errors_total}\n"));
    out.push_str("# HELP apl_latency_ms_avg Average evaluate latency in milliseconds.\n");
    out.push_str("# TYPE apl_latency_ms_avg gauge\n");
    out.push_str(&format!("apl_latency_ms_avg {latency_avg}\n"));
    out.push_str("# HELP apl_uptime_seconds Seconds since the server started.\n");
    out.push_str("# TYPE apl_uptime_seconds gauge\n");
    out.push_str(&format!("apl_uptime_seconds {uptime}\n"));

    out.push_str("# HELP apl_requests_by_event_total Evaluate requests by event type.\n");
    out.push_str("# TYPE apl_requests_by_event_total counter\n");
    for (event_type, count) in state.per_event.lock().await.iter() {
        out.push_str(&format!("apl_requests_by_event_total{{event_type=\"{event_type}\"}} {count}\n"));
    }

    out.push_str("# HELP apl_verdicts_by_decision_total Verdicts produced by decision.\n");
    out.push_str("# TYPE apl_verdicts_by_decision_total counter\n");
    for (decision, count) in state.per_decision.lock().await.iter() {
        out.push_str(&format!("apl_verdicts_by_decision_total{{decision=\"{decision}\"}} {count}\n"));
    }

    out
}

async fn handle_events() -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let stream = async_stream::stream! {
        let mut ticks = tokio::time::interval(HEARTBEAT_INTERVAL);
        loop {
            ticks.tick().await;
            yield Ok(SseEvent::default().event("heartbeat").data("keep-alive"));
        }
    };
    Sse::new(stream)
}

async fn handle_not_found() -> Response {
    warn!("request to unknown path");
    (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response()
}
