use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The shortest ticker the system accepts.
pub const MIN_SYMBOL_LEN: usize = 2;
/// The longest ticker the system accepts.
pub const MAX_SYMBOL_LEN: usize = 6;

/// A ticker identifying a tradeable instrument (e.g. "AAPL").
///
/// A `Symbol` can carry any text so that malformed input can travel as far as
/// the validator and be reported by name. Use [`Symbol::is_well_formed`] to
/// check the canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

/// An ordered set of symbols, used for price-log filters and ownership checks.
pub type SymbolSet = BTreeSet<Symbol>;

impl Symbol {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the symbol is 2 to 6 uppercase ASCII letters.
    pub fn is_well_formed(&self) -> bool {
        (MIN_SYMBOL_LEN..=MAX_SYMBOL_LEN).contains(&self.0.len())
            && self.0.bytes().all(|b| b.is_ascii_uppercase())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
