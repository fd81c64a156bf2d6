use crate::error::AnalyticsError;
use crate::report::{BestUnowned, Performance, PositionValue, Stability, Valuation};
use core_types::{Holding, PriceWindow, Symbol, SymbolSet};
use rust_decimal::Decimal;

/// A stateless calculator for portfolio metrics over a window of prices.
///
/// Every search walks the window in symbol order and only replaces its current
/// best on a strict improvement, so ties go to the lexicographically first
/// symbol.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values `holdings` at the most recent price in `window`.
    ///
    /// # Errors
    ///
    /// `MissingPrice` for the first holding whose symbol has no price, and
    /// `Overflow` when a position or the total leaves the `Decimal` range.
    pub fn valuation(
        &self,
        holdings: &[Holding],
        window: &PriceWindow,
    ) -> Result<Valuation, AnalyticsError> {
        let mut valuation = Valuation::empty();

        for holding in holdings {
            let price = window
                .latest(holding.symbol_key())
                .ok_or_else(|| AnalyticsError::MissingPrice(holding.symbol.clone()))?;
            let overflow = || AnalyticsError::Overflow(holding.symbol.clone());
            let value = price
                .checked_mul(Decimal::from(holding.amount))
                .ok_or_else(overflow)?;

            valuation.total = valuation.total.checked_add(value).ok_or_else(overflow)?;
            valuation.positions.push(PositionValue {
                symbol: holding.symbol.clone(),
                amount: holding.amount,
                price,
                value,
            });
        }

        tracing::debug!(positions = valuation.positions.len(), total = %valuation.total, "Valued holdings.");
        Ok(valuation)
    }

    /// Finds the symbol whose price rose the most over `past_days`.
    ///
    /// Series shorter than `past_days` are measured over what is available.
    pub fn most_performing(
        &self,
        window: &PriceWindow,
        past_days: usize,
    ) -> Result<Performance, AnalyticsError> {
        if past_days == 0 {
            return Err(AnalyticsError::InvalidWindow(past_days));
        }

        let mut best: Option<(&Symbol, Decimal)> = None;
        for (symbol, series) in window.iter() {
            let Some(delta) = price_change(symbol, series, past_days)? else {
                continue;
            };
            if delta <= Decimal::ZERO {
                continue;
            }
            if best.is_none_or(|(_, top)| delta > top) {
                best = Some((symbol, delta));
            }
        }

        Ok(match best {
            Some((symbol, delta)) => Performance::Rose {
                symbol: symbol.clone(),
                delta,
            },
            None => Performance::NoneRose,
        })
    }

    /// Finds the symbol with the smallest `max - min` spread in `window`.
    ///
    /// `Ok(None)` when the window holds no prices at all.
    pub fn most_stable(&self, window: &PriceWindow) -> Result<Option<Stability>, AnalyticsError> {
        let mut best: Option<(&Symbol, Decimal)> = None;
        for (symbol, series) in window.iter() {
            let Some(spread) = fluctuation(symbol, series)? else {
                continue;
            };
            if best.is_none_or(|(_, narrowest)| spread < narrowest) {
                best = Some((symbol, spread));
            }
        }

        Ok(best.map(|(symbol, fluctuation)| Stability {
            symbol: symbol.clone(),
            fluctuation,
        }))
    }

    /// Finds the highest latest price among symbols not in `owned`.
    pub fn best_unowned(&self, window: &PriceWindow, owned: &SymbolSet) -> Option<BestUnowned> {
        let mut best: Option<(&Symbol, Decimal)> = None;
        for (symbol, series) in window.iter() {
            if owned.contains(symbol) {
                continue;
            }
            let Some(&price) = series.first() else {
                continue;
            };
            if best.is_none_or(|(_, highest)| price > highest) {
                best = Some((symbol, price));
            }
        }

        best.map(|(symbol, price)| BestUnowned {
            symbol: symbol.clone(),
            price,
        })
    }
}

/// Newest price minus the price `past_days - 1` records back, clamped to the
/// oldest available record. `Ok(None)` for an empty series.
fn price_change(
    symbol: &Symbol,
    series: &[Decimal],
    past_days: usize,
) -> Result<Option<Decimal>, AnalyticsError> {
    let (Some(newest), Some(index)) = (series.first(), past_days.min(series.len()).checked_sub(1))
    else {
        return Ok(None);
    };
    newest
        .checked_sub(series[index])
        .map(Some)
        .ok_or_else(|| AnalyticsError::Overflow(symbol.clone()))
}

/// `max - min` over a series. `Ok(None)` for an empty series.
fn fluctuation(symbol: &Symbol, series: &[Decimal]) -> Result<Option<Decimal>, AnalyticsError> {
    let (Some(max), Some(min)) = (series.iter().max(), series.iter().min()) else {
        return Ok(None);
    };
    max.checked_sub(*min)
        .map(Some)
        .ok_or_else(|| AnalyticsError::Overflow(symbol.clone()))
}
