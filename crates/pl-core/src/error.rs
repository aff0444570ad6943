use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Unsupported file type: {extension}. Please upload .csv or .xes.")]
    UnsupportedFormat { extension: String },
    #[error(
        "CSV file is missing required columns: {}. Expected: case_id, activity, timestamp",
        .missing.join(", ")
    )]
    MissingColumns { missing: Vec<String> },
    #[error("row {row} has no value for required column '{column}'")]
    MissingValue { row: usize, column: String },
    #[error("row {row} has an unparseable timestamp: '{value}'")]
    InvalidTimestamp { row: usize, value: String },
    #[error("malformed CSV: {reason}")]
    Csv { reason: String },
    #[error("malformed XES: {reason}")]
    Xes { reason: String },
    #[error("failed to read event log: {reason}")]
    Io { reason: String },
}

impl LogError {
    /// Problems with the uploaded content, as opposed to the server failing
    /// to read it.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("process discovery failed: {reason}")]
    Failed { reason: String },
}

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("invalid graph input: {reason}")]
    InvalidGraphInput { reason: String },
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Insight(#[from] InsightError),
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ProcessError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Log(err) if err.is_validation())
    }
}
