//! Live-feed dataset: a headered CSV of five-minute traffic aggregates.

use crate::error::AppError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

pub const TIMESTAMP_COLUMN: &str = "5 Minutes";
pub const LANE1_FLOW_COLUMN: &str = "Lane 1 Flow (Veh/5 Minutes)";
pub const LANE2_FLOW_COLUMN: &str = "Lane 2 Flow (Veh/5 Minutes)";
pub const LANE1_SPEED_COLUMN: &str = "Lane 1 Speed (mph)";
pub const LANE2_SPEED_COLUMN: &str = "Lane 2 Speed (mph)";
pub const TOTAL_FLOW_COLUMN: &str = "Flow (Veh/5 Minutes)";
pub const AVG_SPEED_COLUMN: &str = "Speed (mph)";

/// One row keyed by the file's header, values left as the raw cell strings.
pub type RawRow = Map<String, Value>;

pub fn load_raw_rows(path: impl AsRef<Path>) -> Result<Vec<RawRow>, AppError> {
    let contents = std::fs::read_to_string(path)?;
    parse_raw_rows(&contents)
}

pub fn parse_raw_rows(contents: &str) -> Result<Vec<RawRow>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(contents.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| (name.to_string(), Value::String(cell.to_string())))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Typed view of a raw row. Cells that do not hold a number become NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRecord {
    pub timestamp: String,
    pub lane1_flow: f64,
    pub lane2_flow: f64,
    pub lane1_speed: f64,
    pub lane2_speed: f64,
    pub total_flow: f64,
    pub avg_speed: f64,
}

impl TrafficRecord {
    pub fn from_raw(row: &RawRow) -> Self {
        Self {
            timestamp: row
                .get(TIMESTAMP_COLUMN)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            lane1_flow: number_cell(row, LANE1_FLOW_COLUMN),
            lane2_flow: number_cell(row, LANE2_FLOW_COLUMN),
            lane1_speed: number_cell(row, LANE1_SPEED_COLUMN),
            lane2_speed: number_cell(row, LANE2_SPEED_COLUMN),
            total_flow: number_cell(row, TOTAL_FLOW_COLUMN),
            avg_speed: number_cell(row, AVG_SPEED_COLUMN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneShare {
    pub name: String,
    pub value: f64,
}

/// Per-lane split of the record's flow.
pub fn lane_distribution(record: &TrafficRecord) -> Vec<LaneShare> {
    vec![
        LaneShare {
            name: "Lane 1".to_string(),
            value: record.lane1_flow,
        },
        LaneShare {
            name: "Lane 2".to_string(),
            value: record.lane2_flow,
        },
    ]
}

fn number_cell(row: &RawRow, column: &str) -> f64 {
    row.get(column)
        .and_then(Value::as_str)
        .map(coerce_number)
        .unwrap_or(f64::NAN)
}

/// Whole-string numeric coercion: blank is zero, anything else must parse fully.
/// Unsigned `0x`, `0o` and `0b` literals are read in their radix; values past
/// `u64::MAX` give NaN.
pub fn coerce_number(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(value) = radix_literal(trimmed) {
        return value;
    }
    match trimmed.trim_start_matches(['+', '-']) {
        "Infinity" => {
            if trimmed.starts_with('-') {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }
        }
        rest if rest.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') => {
            f64::NAN
        }
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

fn radix_literal(text: &str) -> Option<f64> {
    let radix = match text.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Some(f64::NAN);
    }
    Some(
        u64::from_str_radix(digits, radix)
            .map(|value| value as f64)
            .unwrap_or(f64::NAN),
    )
}
