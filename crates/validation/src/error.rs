use core_types::Symbol;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A single rule violation found while checking a proposed portfolio.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid amount '{amount}' for symbol '{symbol}'")]
    InvalidAmount { symbol: Symbol, amount: i64 },

    #[error("Invalid symbol '{0}': expected 2 to 6 uppercase letters")]
    InvalidSymbol(Symbol),

    #[error("The symbol '{0}' is not supported")]
    UnsupportedSymbol(Symbol),

    #[error("The symbol '{0}' appears more than once")]
    DuplicateSymbol(Symbol),

    #[error(transparent)]
    SymbolSource(#[from] SymbolSourceError),
}

/// The reference list of supported symbols could not be consulted.
#[derive(Error, Debug)]
pub enum SymbolSourceError {
    #[error("Failed to read supported symbols from '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
