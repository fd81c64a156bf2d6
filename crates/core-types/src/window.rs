use crate::symbol::Symbol;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-symbol, newest-first slices of historical prices.
///
/// Index 0 of every series is the most recent price, index `k` is `k` days
/// before it. Every stored series holds at least one value. Symbols iterate in
/// lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceWindow {
    series: BTreeMap<Symbol, Vec<Decimal>>,
}

impl PriceWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the series for `symbol`. Empty series are dropped so that the
    /// non-empty invariant holds.
    pub fn insert(&mut self, symbol: Symbol, values: Vec<Decimal>) {
        if !values.is_empty() {
            self.series.insert(symbol, values);
        }
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&[Decimal]> {
        self.series.get(symbol).map(Vec::as_slice)
    }

    /// The most recent price of `symbol`.
    pub fn latest(&self, symbol: &Symbol) -> Option<Decimal> {
        self.series.get(symbol).and_then(|v| v.first().copied())
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.series.contains_key(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &[Decimal])> {
        self.series.iter().map(|(s, v)| (s, v.as_slice()))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.series.keys()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<(Symbol, Vec<Decimal>)> for PriceWindow {
    fn from_iter<T: IntoIterator<Item = (Symbol, Vec<Decimal>)>>(iter: T) -> Self {
        let mut window = PriceWindow::new();
        for (symbol, values) in iter {
            window.insert(symbol, values);
        }
        window
    }
}
