use crate::api::responses::{
    CombinedPayload, ErrorResponse, HealthBody, HealthStatus, MetricsResponse, PredictionPayload,
    SnapshotResponse, TrafficDataBody,
};
use crate::feed::{self, TrafficRecord};
use crate::prediction::{self, metrics};
use crate::state::AppState;
use crate::window::WindowRange;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error};

const FETCH_ERROR_MESSAGE: &str = "Failed to fetch data";

#[derive(Debug)]
enum TimestampError {
    Format(time::error::Format),
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::Format(err) => write!(f, "timestamp format error: {err}"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TrafficQuery {
    pub range: Option<String>,
    pub data_type: Option<String>,
}

impl TrafficQuery {
    /// Builds the query from raw pairs. A repeated key keeps its first value.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.clone())
        };
        Self {
            range: first("range"),
            data_type: first("type"),
        }
    }
}

/// Which payload `/traffic-data` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataKind {
    Realtime,
    Prediction,
    #[default]
    Both,
}

impl DataKind {
    /// Anything other than `realtime` or `prediction` gets both payloads.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("realtime") => Self::Realtime,
            Some("prediction") => Self::Prediction,
            _ => Self::Both,
        }
    }
}

pub enum JsonResponse<T> {
    Success(T),
    Error {
        status: StatusCode,
        body: ErrorResponse,
    },
}

impl<T: serde::Serialize> IntoResponse for JsonResponse<T> {
    fn into_response(self) -> Response {
        match self {
            JsonResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            JsonResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub type TrafficResponse = JsonResponse<TrafficDataBody>;
pub type SnapshotResult = JsonResponse<SnapshotResponse>;
pub type MetricsResult = JsonResponse<MetricsResponse>;

pub async fn get_traffic_data(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let query = TrafficQuery::from_pairs(&pairs);
    let now = SystemTime::now();
    run_blocking(move || build_traffic_response(&state, &query, now)).await
}

pub async fn get_traffic_snapshot(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let query = TrafficQuery::from_pairs(&pairs);
    let now = SystemTime::now();
    run_blocking(move || build_snapshot_response(&state, &query, now)).await
}

pub async fn get_prediction_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let now = SystemTime::now();
    run_blocking(move || build_metrics_response(&state, now)).await
}

pub async fn get_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let now = SystemTime::now();
    match tokio::task::spawn_blocking(move || build_health_response(&state, now)).await {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "Health check task failed");
            let timestamp =
                format_timestamp(now).unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string());
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthBody {
                    status: HealthStatus::Ko,
                    timestamp,
                }),
            )
        }
    }
}

/// Runs a file-reading response builder on the blocking pool.
async fn run_blocking<T, F>(build: F) -> JsonResponse<T>
where
    F: FnOnce() -> JsonResponse<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(build).await {
        Ok(response) => response,
        Err(err) => fetch_error(&format!("blocking task failed: {err}")),
    }
}

pub fn build_traffic_response(
    state: &AppState,
    query: &TrafficQuery,
    now: SystemTime,
) -> TrafficResponse {
    let mut rows = match feed::load_raw_rows(state.traffic_path()) {
        Ok(rows) => rows,
        Err(err) => {
            return fetch_error(&format!("live feed unavailable: {err}"));
        }
    };

    let window_size = WindowRange::from_query(query.range.as_deref()).window_size();
    let range = match state.cursor().advance(window_size, rows.len()) {
        Ok(range) => range,
        Err(err) => {
            return fetch_error(&format!("cursor unavailable: {err}"));
        }
    };
    debug!(
        start = range.start,
        len = range.len(),
        dataset_len = rows.len(),
        "Serving traffic window"
    );
    let window: Vec<_> = rows.drain(range).collect();

    let kind = DataKind::from_query(query.data_type.as_deref());
    if kind == DataKind::Realtime {
        return JsonResponse::Success(TrafficDataBody::Realtime(window));
    }

    let predictions = prediction::load_predictions_or_empty(state.predictions_path());
    let last_update = match format_timestamp(now) {
        Ok(formatted) => formatted,
        Err(_) => return fetch_error("timestamp formatting failure"),
    };

    match kind {
        DataKind::Prediction => JsonResponse::Success(TrafficDataBody::Prediction(
            PredictionPayload {
                data: predictions,
                last_update,
            },
        )),
        _ => JsonResponse::Success(TrafficDataBody::Both(CombinedPayload {
            traffic: window,
            predictions,
            last_update,
        })),
    }
}

fn build_snapshot_response(
    state: &AppState,
    query: &TrafficQuery,
    now: SystemTime,
) -> SnapshotResult {
    let rows = match feed::load_raw_rows(state.traffic_path()) {
        Ok(rows) => rows,
        Err(err) => {
            return fetch_error(&format!("live feed unavailable: {err}"));
        }
    };

    let window_size = WindowRange::from_query(query.range.as_deref()).window_size();
    let range = match state.cursor().peek(window_size, rows.len()) {
        Ok(range) => range,
        Err(err) => {
            return fetch_error(&format!("cursor unavailable: {err}"));
        }
    };

    let records: Vec<TrafficRecord> = rows[range].iter().map(TrafficRecord::from_raw).collect();
    let current = records.last().cloned();
    let lane_distribution = current
        .as_ref()
        .map(feed::lane_distribution)
        .unwrap_or_default();

    match format_timestamp(now) {
        Ok(last_update) => JsonResponse::Success(SnapshotResponse {
            records,
            current,
            lane_distribution,
            last_update,
        }),
        Err(_) => fetch_error("timestamp formatting failure"),
    }
}

fn build_metrics_response(state: &AppState, now: SystemTime) -> MetricsResult {
    let predictions = prediction::load_predictions_or_empty(state.predictions_path());
    let metrics = metrics::compute_metrics(&predictions);

    match format_timestamp(now) {
        Ok(last_update) => JsonResponse::Success(MetricsResponse {
            metrics,
            last_update,
        }),
        Err(_) => fetch_error("timestamp formatting failure"),
    }
}

fn build_health_response(state: &AppState, now: SystemTime) -> (StatusCode, Json<HealthBody>) {
    let (status_code, status) = match feed::load_raw_rows(state.traffic_path()) {
        Ok(_) => (StatusCode::OK, HealthStatus::Ok),
        Err(err) => {
            error!(error = %err, "Live feed unreadable during health check");
            (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Ko)
        }
    };
    let timestamp = format_timestamp(now).unwrap_or_else(|err| {
        error!(error = %err, "Failed to format health timestamp");
        "1970-01-01T00:00:00Z".to_string()
    });

    (status_code, Json(HealthBody { status, timestamp }))
}

fn fetch_error<T>(message: &str) -> JsonResponse<T> {
    error!(message = message, "Error reading data");
    JsonResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorResponse {
            error: FETCH_ERROR_MESSAGE.to_string(),
        },
    }
}

fn format_timestamp(timestamp: SystemTime) -> Result<String, TimestampError> {
    let datetime = OffsetDateTime::from(timestamp);
    datetime.format(&Rfc3339).map_err(TimestampError::Format)
}
