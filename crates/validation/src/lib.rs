//! # Portfolio Validator
//!
//! Pure rule checking over proposed `(symbol, amount)` entries, plus the
//! supported-symbols lookup the rules depend on.
//!
//! ## Public API
//!
//! - `PortfolioValidator` / `validate_portfolio`: fail-fast rule checking.
//! - `PortfolioMode`: new-portfolio vs existing-portfolio amount semantics.
//! - `SupportedSymbols`: lookup trait, with `SupportedSymbolsFile` and
//!   `StaticSymbols` implementations.

pub mod error;
pub mod symbols;
pub mod validator;

pub use error::{SymbolSourceError, ValidationError};
pub use symbols::{StaticSymbols, SupportedSymbols, SupportedSymbolsFile};
pub use validator::{PortfolioMode, PortfolioValidator, validate_portfolio};
