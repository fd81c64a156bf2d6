use crate::error::CoreError;
use crate::symbol::{Symbol, SymbolSet};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Generated identifier of a client. Valid identifiers are strictly positive.
pub type ClientId = i64;

/// A client's position in one symbol.
///
/// Two holdings are only considered "the same position" when their symbols
/// match; use [`Holding::symbol_key`] with [`contains_symbol`] or
/// [`find_by_symbol`] for that comparison. The derived `PartialEq` compares
/// every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: Symbol,
    /// Number of units held. Never negative once stored.
    pub amount: i64,
    pub owner: ClientId,
}

impl Holding {
    pub fn new(symbol: Symbol, amount: i64, owner: ClientId) -> Self {
        Self { symbol, amount, owner }
    }

    /// The key that identifies a holding within its owner's portfolio.
    pub fn symbol_key(&self) -> &Symbol {
        &self.symbol
    }
}

/// Returns true if any holding in `holdings` is keyed by `symbol`.
pub fn contains_symbol(holdings: &[Holding], symbol: &Symbol) -> bool {
    find_by_symbol(holdings, symbol).is_some()
}

/// Finds the holding keyed by `symbol`, if any.
pub fn find_by_symbol<'a>(holdings: &'a [Holding], symbol: &Symbol) -> Option<&'a Holding> {
    holdings.iter().find(|h| h.symbol_key() == symbol)
}

/// A requested `(symbol, amount)` pair as submitted by a caller.
///
/// The amount is signed so that negative input reaches the validator and is
/// rejected there with a descriptive message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub symbol: Symbol,
    pub amount: i64,
}

impl PortfolioEntry {
    pub fn new(symbol: impl Into<Symbol>, amount: i64) -> Self {
        Self {
            symbol: symbol.into(),
            amount,
        }
    }

    /// Turns the entry into a holding owned by `owner`.
    pub fn into_holding(self, owner: ClientId) -> Holding {
        Holding::new(self.symbol, self.amount, owner)
    }
}

/// Parses the `SYMBOL=AMOUNT` shorthand used on the command line.
impl FromStr for PortfolioEntry {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (symbol, amount) = s
            .split_once('=')
            .ok_or_else(|| CoreError::MalformedEntry(s.to_string()))?;
        let amount = amount.trim().parse::<i64>().map_err(|e| {
            CoreError::InvalidInput(format!("amount of '{}'", symbol.trim()), e.to_string())
        })?;
        Ok(Self::new(symbol.trim(), amount))
    }
}

/// A client and the holdings it currently owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub client_id: ClientId,
    pub holdings: Vec<Holding>,
}

impl Client {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            holdings: Vec::new(),
        }
    }

    /// The set of symbols this client owns.
    pub fn symbols(&self) -> SymbolSet {
        self.holdings.iter().map(|h| h.symbol_key().clone()).collect()
    }
}
