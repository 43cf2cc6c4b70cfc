use crate::feed::{LaneShare, RawRow, TrafficRecord};
use crate::prediction::PredictionRecord;
use crate::prediction::metrics::PredictionMetrics;
use serde::Serialize;

/// Body of a successful `/traffic-data` call; its shape depends on `type`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TrafficDataBody {
    Realtime(Vec<RawRow>),
    Prediction(PredictionPayload),
    Both(CombinedPayload),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionPayload {
    pub data: Vec<PredictionRecord>,
    pub last_update: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedPayload {
    pub traffic: Vec<RawRow>,
    pub predictions: Vec<PredictionRecord>,
    pub last_update: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    pub records: Vec<TrafficRecord>,
    pub current: Option<TrafficRecord>,
    pub lane_distribution: Vec<LaneShare>,
    pub last_update: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub metrics: PredictionMetrics,
    pub last_update: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Ko,
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: HealthStatus,
    pub timestamp: String,
}
