//! Error types for loading benchmark tables and building figures.

use std::path::PathBuf;

/// Errors surfaced by table loading, metric selection and figure building.
///
/// None of these are retried. They are reported once to whoever triggered
/// the read (a CLI command or a dashboard request).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("results file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },
    #[error("{source_name} has no column '{column}'")]
    MissingColumn { source_name: String, column: String },
    #[error("{source_name}: row {row} column '{column}' is not a number: '{value}'")]
    InvalidValue {
        source_name: String,
        column: String,
        row: usize,
        value: String,
    },
    #[error("invalid metric: '{0}'")]
    InvalidMetric(String),
    #[error("metric '{metric}' divides by zero at row {row}")]
    DivisionByZero { metric: &'static str, row: usize },
    #[error("{0} has no outcome records")]
    EmptyOutcomes(String),
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
