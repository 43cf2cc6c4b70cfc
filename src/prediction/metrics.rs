//! Accuracy metrics over a batch of prediction records.
//!
//! Recomputed from scratch for every batch; nothing is accumulated between
//! calls.

use crate::prediction::PredictionRecord;
use serde::Serialize;

/// Relative error above which a prediction counts towards the error rate.
pub const ERROR_RATE_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionMetrics {
    /// 100 minus MAPE.
    pub accuracy: f64,
    /// Mean absolute percentage error.
    pub mape: f64,
    /// Mean prediction latency in seconds.
    pub avg_prediction_time: f64,
    /// Percentage of predictions whose relative error exceeds the threshold.
    pub error_rate: f64,
    pub sample_count: usize,
    /// Rows left out of the relative-error terms because their actual flow is zero.
    pub excluded_rows: usize,
}

/// `|predicted - actual| / actual`, or `None` when actual is zero.
pub fn relative_error(record: &PredictionRecord) -> Option<f64> {
    if record.actual_flow == 0.0 {
        return None;
    }
    Some(record.error() / record.actual_flow)
}

pub fn compute_metrics(records: &[PredictionRecord]) -> PredictionMetrics {
    if records.is_empty() {
        return PredictionMetrics::default();
    }

    let avg_prediction_time =
        records.iter().map(|r| r.prediction_time).sum::<f64>() / records.len() as f64;
    let errors: Vec<f64> = records.iter().filter_map(relative_error).collect();
    let excluded_rows = records.len() - errors.len();

    if errors.is_empty() {
        return PredictionMetrics {
            avg_prediction_time,
            sample_count: records.len(),
            excluded_rows,
            ..PredictionMetrics::default()
        };
    }

    let count = errors.len() as f64;
    let mape = errors.iter().sum::<f64>() / count * 100.0;
    let over_threshold = errors.iter().filter(|e| **e > ERROR_RATE_THRESHOLD).count();
    let error_rate = over_threshold as f64 / count * 100.0;

    PredictionMetrics {
        accuracy: 100.0 - mape,
        mape,
        avg_prediction_time,
        error_rate,
        sample_count: records.len(),
        excluded_rows,
    }
}
