use crate::error::SymbolSourceError;
use configuration::SupportedSymbolsSettings;
use core_types::{Symbol, SymbolSet};
use std::fs;
use std::path::{Path, PathBuf};

/// A lookup over the symbols the system currently supports.
pub trait SupportedSymbols: Send + Sync {
    /// Exact-match membership test for a single symbol.
    fn is_supported(&self, symbol: &Symbol) -> Result<bool, SymbolSourceError>;
}

/// Supported symbols backed by a maintained reference file.
///
/// The file holds comma-separated symbols across any number of lines. It is
/// re-read on every lookup, so edits take effect without a restart.
#[derive(Debug, Clone)]
pub struct SupportedSymbolsFile {
    path: PathBuf,
}

impl SupportedSymbolsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_settings(settings: &SupportedSymbolsSettings) -> Self {
        Self::new(settings.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole reference list.
    pub fn load(&self) -> Result<SymbolSet, SymbolSourceError> {
        Ok(self.read()?.split([',', '\n', '\r']).filter_map(to_symbol).collect())
    }

    fn read(&self) -> Result<String, SymbolSourceError> {
        fs::read_to_string(&self.path).map_err(|source| SymbolSourceError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

fn to_symbol(raw: &str) -> Option<Symbol> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| Symbol::from(raw))
}

impl SupportedSymbols for SupportedSymbolsFile {
    fn is_supported(&self, symbol: &Symbol) -> Result<bool, SymbolSourceError> {
        let contents = self.read()?;
        Ok(contents
            .lines()
            .flat_map(|line| line.split(','))
            .any(|candidate| candidate.trim() == symbol.as_str()))
    }
}

/// A fixed, in-memory set of supported symbols.
#[derive(Debug, Clone, Default)]
pub struct StaticSymbols {
    symbols: SymbolSet,
}

impl StaticSymbols {
    pub fn new(symbols: impl IntoIterator<Item = impl Into<Symbol>>) -> Self {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }
}

impl SupportedSymbols for StaticSymbols {
    fn is_supported(&self, symbol: &Symbol) -> Result<bool, SymbolSourceError> {
        Ok(self.symbols.contains(symbol))
    }
}
