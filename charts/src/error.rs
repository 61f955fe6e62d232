//! Error types for chart generation.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("cannot read {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("line {line}: invalid number '{value}' in column '{column}'")]
    InvalidNumber {
        column: String,
        value: String,
        line: u64,
    },

    #[error("no rows left to plot")]
    NoData,

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("drawing failed: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;
