use std::net::SocketAddr;
use std::sync::Arc;
use traffic_window::config::{self, Config};
use traffic_window::state::{AppState, DataSources};
use traffic_window::{api, feed};

fn init_tracing(config: &Config) {
    let level = config.log_level().unwrap_or(tracing::Level::INFO);
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    if config.log_level().is_none() {
        tracing::warn!(
            configured = %config.logging.level,
            "Unknown logging level, using info"
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let config = config::load_from_path(&config_path)?;
    init_tracing(&config);
    tracing::info!(
        config_path = %config_path,
        app = %config.app.name,
        "traffic-window starting"
    );

    let sources = DataSources::from_config(&config);
    match feed::load_raw_rows(&sources.traffic_path) {
        Ok(rows) => tracing::info!(
            path = %sources.traffic_path.display(),
            records = rows.len(),
            "Live feed found"
        ),
        Err(err) => tracing::warn!(
            path = %sources.traffic_path.display(),
            error = %err,
            "Live feed unreadable, requests will fail until it is available"
        ),
    }
    if !sources.predictions_path.is_file() {
        tracing::warn!(
            path = %sources.predictions_path.display(),
            "Prediction log not found, predictions will be empty"
        );
    }

    let state = Arc::new(AppState::new(sources));
    let app = api::router(state);
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
