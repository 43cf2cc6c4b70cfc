//! Prediction log: headerless CSV of model output against ground truth.
//!
//! Columns are positional. Column 0 is the timestamp, 2 the predicted flow,
//! 3 the actual flow, 4 the prediction latency in seconds and 5 the global
//! time. Column 1 (model name) is ignored.

use crate::error::AppError;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

pub mod metrics;

const TIMESTAMP_INDEX: usize = 0;
const PREDICTED_INDEX: usize = 2;
const ACTUAL_INDEX: usize = 3;
const LATENCY_INDEX: usize = 4;
const GLOBAL_TIME_INDEX: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub timestamp: String,
    pub predicted_flow: f64,
    pub actual_flow: f64,
    pub prediction_time: f64,
    pub global_time: f64,
}

impl PredictionRecord {
    /// Absolute difference between predicted and actual flow.
    pub fn error(&self) -> f64 {
        (self.predicted_flow - self.actual_flow).abs()
    }

    /// Maps one log row, or `None` when predicted, actual or latency is not numeric.
    pub fn from_row(row: &csv::StringRecord) -> Option<Self> {
        let column = |index: usize| row.get(index).map(parse_float_prefix).unwrap_or(f64::NAN);

        let record = Self {
            timestamp: row.get(TIMESTAMP_INDEX).unwrap_or_default().to_string(),
            predicted_flow: column(PREDICTED_INDEX),
            actual_flow: column(ACTUAL_INDEX),
            prediction_time: column(LATENCY_INDEX),
            global_time: column(GLOBAL_TIME_INDEX),
        };

        if record.predicted_flow.is_nan()
            || record.actual_flow.is_nan()
            || record.prediction_time.is_nan()
        {
            return None;
        }
        Some(record)
    }
}

pub fn load_predictions(path: impl AsRef<Path>) -> Result<Vec<PredictionRecord>, AppError> {
    let contents = std::fs::read_to_string(path)?;
    parse_predictions(&contents)
}

pub fn parse_predictions(contents: &str) -> Result<Vec<PredictionRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(contents.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        if let Some(record) = PredictionRecord::from_row(&result?) {
            records.push(record);
        }
    }
    Ok(records)
}

/// Loads the prediction log, degrading to an empty list when it cannot be read.
pub fn load_predictions_or_empty(path: &Path) -> Vec<PredictionRecord> {
    match load_predictions(path) {
        Ok(records) => records,
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "Prediction log unavailable, serving empty predictions"
            );
            Vec::new()
        }
    }
}

/// Parses the longest leading decimal number, ignoring whatever trails it.
/// Leading whitespace is skipped; no leading number gives NaN.
pub fn parse_float_prefix(cell: &str) -> f64 {
    let text = cell.trim_start();
    let bytes = text.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if text[end..].starts_with("Infinity") {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = leading_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = leading_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = leading_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse().unwrap_or(f64::NAN)
}

fn leading_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
