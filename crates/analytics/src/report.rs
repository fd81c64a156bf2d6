use core_types::Symbol;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The value of one holding at its most recent price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionValue {
    pub symbol: Symbol,
    pub amount: i64,
    pub price: Decimal,
    pub value: Decimal,
}

/// A portfolio valued at the latest known prices.
///
/// `positions` follows the order of the holdings that were valued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    pub total: Decimal,
    pub positions: Vec<PositionValue>,
}

impl Valuation {
    pub fn empty() -> Self {
        Self {
            total: Decimal::ZERO,
            positions: Vec::new(),
        }
    }
}

/// Outcome of the most-performing search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Performance {
    /// The symbol with the largest strictly positive change.
    Rose { symbol: Symbol, delta: Decimal },
    /// No symbol's price went up over the window.
    NoneRose,
}

/// The symbol whose price moved within the narrowest range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stability {
    pub symbol: Symbol,
    /// `max - min` over the window.
    pub fluctuation: Decimal,
}

/// The highest-priced symbol a client does not own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestUnowned {
    pub symbol: Symbol,
    pub price: Decimal,
}
