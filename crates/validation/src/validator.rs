use crate::error::ValidationError;
use crate::symbols::SupportedSymbols;
use core_types::{PortfolioEntry, Symbol};
use std::collections::HashMap;
use std::sync::Arc;

/// Whether the entries describe a brand-new portfolio or adjust an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortfolioMode {
    /// Every entry opens a holding, so amounts start at 1.
    New,
    /// Entries adjust existing holdings; an amount of 0 removes the holding.
    Existing,
}

impl PortfolioMode {
    fn min_amount(self) -> i64 {
        match self {
            PortfolioMode::New => 1,
            PortfolioMode::Existing => 0,
        }
    }
}

/// Checks proposed portfolio entries against the business rules.
///
/// Rules are applied fail-fast: amount, symbol shape and support are checked
/// entry by entry, then the whole list is checked for repeated symbols. The
/// first violation is returned.
#[derive(Clone)]
pub struct PortfolioValidator {
    supported: Arc<dyn SupportedSymbols>,
}

impl PortfolioValidator {
    pub fn new(supported: Arc<dyn SupportedSymbols>) -> Self {
        Self { supported }
    }

    pub fn validate(
        &self,
        entries: &[PortfolioEntry],
        mode: PortfolioMode,
    ) -> Result<(), ValidationError> {
        validate_portfolio(entries, mode, self.supported.as_ref())
    }
}

impl std::fmt::Debug for PortfolioValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioValidator").finish_non_exhaustive()
    }
}

/// Validates `entries` against `supported` without constructing a validator.
pub fn validate_portfolio(
    entries: &[PortfolioEntry],
    mode: PortfolioMode,
    supported: &dyn SupportedSymbols,
) -> Result<(), ValidationError> {
    for entry in entries {
        validate_amount(entry, mode)?;
        validate_symbol_pattern(&entry.symbol)?;
        validate_supported(&entry.symbol, supported)?;
    }
    validate_no_duplicates(entries)?;

    tracing::debug!(entries = entries.len(), ?mode, "Portfolio entries passed validation.");
    Ok(())
}

fn validate_amount(entry: &PortfolioEntry, mode: PortfolioMode) -> Result<(), ValidationError> {
    if entry.amount < mode.min_amount() {
        return Err(ValidationError::InvalidAmount {
            symbol: entry.symbol.clone(),
            amount: entry.amount,
        });
    }
    Ok(())
}

fn validate_symbol_pattern(symbol: &Symbol) -> Result<(), ValidationError> {
    if !symbol.is_well_formed() {
        return Err(ValidationError::InvalidSymbol(symbol.clone()));
    }
    Ok(())
}

fn validate_supported(
    symbol: &Symbol,
    supported: &dyn SupportedSymbols,
) -> Result<(), ValidationError> {
    if !supported.is_supported(symbol)? {
        return Err(ValidationError::UnsupportedSymbol(symbol.clone()));
    }
    Ok(())
}

/// Reports the first symbol, in submission order, that occurs more than once.
fn validate_no_duplicates(entries: &[PortfolioEntry]) -> Result<(), ValidationError> {
    let mut counts: HashMap<&Symbol, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(&entry.symbol).or_default() += 1;
    }
    match entries.iter().find(|e| counts[&e.symbol] > 1) {
        Some(duplicate) => Err(ValidationError::DuplicateSymbol(duplicate.symbol.clone())),
        None => Ok(()),
    }
}
