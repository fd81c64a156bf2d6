use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceHistoryError {
    #[error("The price window must span at least one day")]
    InvalidWindow,

    #[error("Failed to open price log '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read price log: {0}")]
    Read(#[from] io::Error),

    #[error("Malformed price log record at line {line}: {reason}")]
    Malformed { line: u64, reason: String },
}

impl PriceHistoryError {
    /// True for failures of the log itself rather than of the caller's request.
    pub fn is_infrastructure(&self) -> bool {
        !matches!(self, PriceHistoryError::InvalidWindow)
    }
}

impl From<csv::Error> for PriceHistoryError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(source) => PriceHistoryError::Read(source),
            other => PriceHistoryError::Malformed {
                line,
                reason: format!("{other:?}"),
            },
        }
    }
}
