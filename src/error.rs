use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("state lock poisoned")]
    StateLock,
}
