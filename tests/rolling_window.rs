use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use traffic_window::api::handlers::{JsonResponse, TrafficQuery, build_traffic_response};
use traffic_window::api::responses::TrafficDataBody;
use traffic_window::prediction::{load_predictions, metrics::compute_metrics};
use traffic_window::state::{AppState, DataSources};
use traffic_window::window::Windows;

fn write_fixture(label: &str, contents: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    let path = std::env::temp_dir().join(format!("traffic-window-it-{label}-{unique}.csv"));
    fs::write(&path, contents)?;
    Ok(path)
}

fn feed_contents(records: usize) -> String {
    let mut contents = String::from("5 Minutes,Flow (Veh/5 Minutes)\n");
    for index in 0..records {
        contents.push_str(&format!("r{index},{index}\n"));
    }
    contents
}

#[test]
fn twenty_records_one_hour_window_wraps_on_tenth_call() -> Result<(), Box<dyn std::error::Error>>
{
    let feed = write_fixture("feed", &feed_contents(20))?;
    let state = AppState::new(DataSources {
        traffic_path: feed.clone(),
        predictions_path: std::env::temp_dir().join("traffic-window-it-absent.csv"),
    });
    let query = TrafficQuery {
        range: Some("1h".to_string()),
        data_type: Some("realtime".to_string()),
    };

    let mut starts = Vec::new();
    for _ in 0..10 {
        match build_traffic_response(&state, &query, SystemTime::now()) {
            JsonResponse::Success(TrafficDataBody::Realtime(rows)) => {
                assert_eq!(rows.len(), 12);
                let start = rows[0]
                    .get("5 Minutes")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                starts.push(start);
            }
            _ => panic!("expected realtime window"),
        }
    }
    let _ = fs::remove_file(&feed);

    let expected: Vec<String> = [0, 1, 2, 3, 4, 5, 6, 7, 8, 0]
        .iter()
        .map(|i| format!("r{i}"))
        .collect();
    assert_eq!(starts, expected);
    assert_eq!(state.cursor().position()?, 1);
    Ok(())
}

#[test]
fn replacing_feed_with_shorter_file_resyncs_cursor() -> Result<(), Box<dyn std::error::Error>> {
    let feed = write_fixture("shrinking-feed", &feed_contents(30))?;
    let state = AppState::new(DataSources {
        traffic_path: feed.clone(),
        predictions_path: std::env::temp_dir().join("traffic-window-it-absent.csv"),
    });
    let query = TrafficQuery {
        range: None,
        data_type: Some("realtime".to_string()),
    };
    for _ in 0..15 {
        let _ = build_traffic_response(&state, &query, SystemTime::now());
    }
    assert_eq!(state.cursor().position()?, 15);

    fs::write(&feed, feed_contents(13))?;
    let response = build_traffic_response(&state, &query, SystemTime::now());
    let _ = fs::remove_file(&feed);

    match response {
        JsonResponse::Success(TrafficDataBody::Realtime(rows)) => {
            assert_eq!(rows.len(), 12);
            assert_eq!(rows[0].get("5 Minutes").and_then(|v| v.as_str()), Some("r0"));
        }
        _ => panic!("expected realtime window"),
    }
    assert_eq!(state.cursor().position()?, 1);
    Ok(())
}

#[test]
fn bundled_prediction_log_yields_finite_metrics() -> Result<(), Box<dyn std::error::Error>> {
    let predictions = load_predictions("data/prediction_results.csv")?;

    let metrics = compute_metrics(&predictions);

    assert!(!predictions.is_empty());
    assert_eq!(metrics.sample_count, predictions.len());
    assert!(metrics.mape.is_finite());
    assert!((metrics.accuracy + metrics.mape - 100.0).abs() < 1e-9);
    assert!((0.0..=100.0).contains(&metrics.error_rate));
    Ok(())
}

#[test]
fn window_generator_is_independent_of_transport() {
    let records: Vec<usize> = (0..4).collect();

    let windows: Vec<&[usize]> = Windows::new(&records, 3).take(4).collect();

    let expected: Vec<&[usize]> = vec![&[0, 1, 2][..], &[1, 2, 3][..], &[0, 1, 2][..], &[1, 2, 3][..]];
    assert_eq!(windows, expected);
}
