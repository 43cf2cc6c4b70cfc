use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

pub mod handlers;
pub mod responses;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/traffic-data", get(handlers::get_traffic_data))
        .route("/traffic-data/snapshot", get(handlers::get_traffic_snapshot))
        .route("/prediction-metrics", get(handlers::get_prediction_metrics))
        .route("/health", get(handlers::get_health))
        .with_state(state)
}
