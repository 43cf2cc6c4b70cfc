use crate::config::Config;
use crate::window::WindowCursor;
use std::path::{Path, PathBuf};

/// Files the server reads on every request. They are never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub traffic_path: PathBuf,
    pub predictions_path: PathBuf,
}

impl DataSources {
    pub fn from_config(config: &Config) -> Self {
        Self {
            traffic_path: config.traffic_path().to_path_buf(),
            predictions_path: config.predictions_path().to_path_buf(),
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    sources: DataSources,
    cursor: WindowCursor,
}

impl AppState {
    pub fn new(sources: DataSources) -> Self {
        Self::with_cursor(sources, WindowCursor::new())
    }

    pub fn with_cursor(sources: DataSources, cursor: WindowCursor) -> Self {
        Self { sources, cursor }
    }

    pub fn traffic_path(&self) -> &Path {
        &self.sources.traffic_path
    }

    pub fn predictions_path(&self) -> &Path {
        &self.sources.predictions_path
    }

    pub fn cursor(&self) -> &WindowCursor {
        &self.cursor
    }
}
