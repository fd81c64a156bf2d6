use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Invalid portfolio entry '{0}': expected SYMBOL=AMOUNT")]
    MalformedEntry(String),
}
