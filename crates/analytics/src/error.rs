use core_types::Symbol;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("No price data available for symbol '{0}'")]
    MissingPrice(Symbol),

    #[error("Values for symbol '{0}' exceed the supported numeric range")]
    Overflow(Symbol),

    #[error("A lookback of {0} days is not meaningful for this metric")]
    InvalidWindow(usize),
}
