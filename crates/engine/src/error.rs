use analytics::AnalyticsError;
use database::DbError;
use price_history::PriceHistoryError;
use thiserror::Error;
use validation::ValidationError;

/// The message shown for any failure of the underlying infrastructure.
pub const INFRASTRUCTURE_MESSAGE: &str =
    "Error while processing your request, please try again later";

/// The failure taxonomy surfaced to callers of the engine.
///
/// Infrastructure details never reach the caller; they are logged at the
/// point of conversion and replaced by [`INFRASTRUCTURE_MESSAGE`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{}", INFRASTRUCTURE_MESSAGE)]
    Infrastructure,
}

impl EngineError {
    /// Logs `detail` and returns the opaque infrastructure error.
    pub fn infrastructure(detail: &dyn std::error::Error) -> Self {
        tracing::error!(error = %detail, "Infrastructure failure.");
        EngineError::Infrastructure
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::SymbolSource(source) => EngineError::infrastructure(&source),
            rejected => EngineError::InvalidArgument(rejected.to_string()),
        }
    }
}

impl From<PriceHistoryError> for EngineError {
    fn from(err: PriceHistoryError) -> Self {
        if err.is_infrastructure() {
            EngineError::infrastructure(&err)
        } else {
            EngineError::InvalidArgument(err.to_string())
        }
    }
}

impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DuplicateHolding { .. } => EngineError::Conflict(err.to_string()),
            DbError::UnknownClient(client_id) => {
                EngineError::NotFound(format!("Client id '{client_id}' does not exist"))
            }
            DbError::NotFound => EngineError::NotFound(err.to_string()),
            other => EngineError::infrastructure(&other),
        }
    }
}

impl From<AnalyticsError> for EngineError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::MissingPrice(_) => EngineError::NotFound(err.to_string()),
            AnalyticsError::InvalidWindow(_) | AnalyticsError::Overflow(_) => {
                EngineError::InvalidArgument(err.to_string())
            }
        }
    }
}
