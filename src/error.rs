use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid report input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Invalid report input: {0}")]
    InvalidInput(String),

    /// User-facing wrapper; the underlying cause is logged where it happens.
    #[error("{0}")]
    Generation(String),
}
