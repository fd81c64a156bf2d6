use crate::cursor::LogCursor;
use crate::error::PriceHistoryError;
use configuration::PriceLogSettings;
use core_types::{PriceWindow, Symbol, SymbolSet};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Read-only access to the externally maintained price log.
///
/// The log holds one `SYMBOL,VALUE[,...]` record per line, grouped
/// contiguously by symbol and ordered newest-first inside each group. Only the
/// first two fields are read. The file is opened for the duration of a single
/// [`PriceHistory::load_window`] call and closed on every exit path.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    path: PathBuf,
}

impl PriceHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_settings(settings: &PriceLogSettings) -> Self {
        Self::new(settings.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads up to `days` newest prices for every symbol in the log, or only
    /// for the symbols in `filter` when one is given.
    pub fn load_window(
        &self,
        filter: Option<&SymbolSet>,
        days: usize,
    ) -> Result<PriceWindow, PriceHistoryError> {
        if days == 0 {
            return Err(PriceHistoryError::InvalidWindow);
        }
        let file = File::open(&self.path).map_err(|source| PriceHistoryError::Open {
            path: self.path.clone(),
            source,
        })?;
        load_window_from_reader(BufReader::new(file), filter, days)
    }
}

/// Scans `reader` once and groups its records into a [`PriceWindow`].
///
/// For every group that passes `filter`, the first `days` values are kept and
/// the rest of the group is consumed without parsing. Groups rejected by the
/// filter are skipped whole. A symbol whose group reappears later in the log
/// keeps the values of its first (newest) group.
pub fn load_window_from_reader<R: Read>(
    reader: R,
    filter: Option<&SymbolSet>,
    days: usize,
) -> Result<PriceWindow, PriceHistoryError> {
    if days == 0 {
        return Err(PriceHistoryError::InvalidWindow);
    }

    let mut cursor = LogCursor::new(reader);
    let mut window = PriceWindow::new();

    while let Some(record) = cursor.next_record() {
        let record = record?;
        let symbol = Symbol::from(record.get(0).unwrap_or_default());

        if !filter.is_none_or(|f| f.contains(&symbol)) {
            let skipped = cursor.skip_group(symbol.as_str());
            tracing::trace!(%symbol, rows = skipped + 1, "Skipped filtered price group.");
            continue;
        }

        if window.contains(&symbol) {
            let skipped = cursor.skip_group(symbol.as_str());
            tracing::warn!(
                %symbol,
                rows = skipped + 1,
                "Price group is not contiguous; ignoring the older rows."
            );
            continue;
        }

        let mut values = Vec::with_capacity(days.min(256));
        values.push(parse_value(&record)?);

        while values.len() < days && cursor.peek_symbol() == Some(symbol.as_str()) {
            match cursor.next_record() {
                Some(next) => values.push(parse_value(&next?)?),
                None => break,
            }
        }

        // Rows past the window still belong to this group.
        cursor.skip_group(symbol.as_str());
        window.insert(symbol, values);
    }

    tracing::debug!(symbols = window.len(), days, "Loaded price window.");
    Ok(window)
}

fn parse_value(record: &StringRecord) -> Result<Decimal, PriceHistoryError> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    let raw = record.get(1).ok_or_else(|| PriceHistoryError::Malformed {
        line,
        reason: "missing value field".to_string(),
    })?;
    parse_price(raw).ok_or_else(|| PriceHistoryError::Malformed {
        line,
        reason: format!("cannot parse price '{raw}'"),
    })
}

/// Parses decimal price text, accepting scientific notation as well.
///
/// Text that `Decimal` cannot represent, such as `1e40` or `NaN`, yields
/// `None`; the reader reports that record as malformed.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const LOG: &str = "AAA,10\nAAA,8\nAAA,9\nBBB,5\nBBB,6\n";

    fn set(symbols: &[&str]) -> SymbolSet {
        symbols.iter().map(|s| Symbol::from(*s)).collect()
    }

    fn series(window: &PriceWindow, symbol: &str) -> Vec<Decimal> {
        window.get(&Symbol::from(symbol)).unwrap_or_default().to_vec()
    }

    #[test]
    fn unrepresentable_prices_do_not_parse() {
        assert_eq!(parse_price("1.5e2"), Some(dec!(150)));
        assert_eq!(parse_price("1e40"), None);
        assert_eq!(parse_price("NaN"), None);
        assert_eq!(parse_price("inf"), None);
    }

    #[test]
    fn groups_are_bounded_and_never_padded() {
        let window = load_window_from_reader(LOG.as_bytes(), Some(&set(&["AAA", "BBB"])), 3).unwrap();
        assert_eq!(series(&window, "AAA"), vec![dec!(10), dec!(8), dec!(9)]);
        assert_eq!(series(&window, "BBB"), vec![dec!(5), dec!(6)]);
    }

    #[test]
    fn window_cap_consumes_rest_of_group() {
        let window = load_window_from_reader(LOG.as_bytes(), None, 1).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(series(&window, "AAA"), vec![dec!(10)]);
        assert_eq!(series(&window, "BBB"), vec![dec!(5)]);
    }

    #[test]
    fn filter_excludes_groups_without_desynchronising() {
        let log = "AAA,1\nAAA,2\nBBB,3\nBBB,4\nBBB,5\nCCC,6\n";
        let window = load_window_from_reader(log.as_bytes(), Some(&set(&["CCC"])), 5).unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(series(&window, "CCC"), vec![dec!(6)]);
    }

    #[test]
    fn filter_with_unknown_symbol_yields_empty_window() {
        let window = load_window_from_reader(LOG.as_bytes(), Some(&set(&["ZZZ"])), 3).unwrap();
        assert!(window.is_empty());
    }

    #[test]
    fn zero_days_is_rejected() {
        let err = load_window_from_reader(LOG.as_bytes(), None, 0).unwrap_err();
        assert!(matches!(err, PriceHistoryError::InvalidWindow));
        assert!(!err.is_infrastructure());
    }

    #[test]
    fn unparseable_value_inside_window_is_malformed() {
        let log = "AAA,10\nAAA,oops\n";
        let err = load_window_from_reader(log.as_bytes(), None, 2).unwrap_err();
        match err {
            PriceHistoryError::Malformed { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("oops"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rows_outside_window_are_not_parsed() {
        let log = "AAA,10\nAAA,oops\nBBB,garbage\nCCC,3\n";
        let window = load_window_from_reader(log.as_bytes(), Some(&set(&["AAA", "CCC"])), 1).unwrap();
        assert_eq!(series(&window, "AAA"), vec![dec!(10)]);
        assert_eq!(series(&window, "CCC"), vec![dec!(3)]);
    }

    #[test]
    fn missing_value_field_is_malformed() {
        let err = load_window_from_reader("AAA\n".as_bytes(), None, 1).unwrap_err();
        assert!(matches!(err, PriceHistoryError::Malformed { .. }));
    }

    #[test]
    fn later_duplicate_group_keeps_newest_values() {
        let log = "AAA,10\nBBB,5\nAAA,1\n";
        let window = load_window_from_reader(log.as_bytes(), None, 3).unwrap();
        assert_eq!(series(&window, "AAA"), vec![dec!(10)]);
    }

    #[test]
    fn price_text_variants() {
        assert_eq!(parse_price("12.50"), Some(dec!(12.50)));
        assert_eq!(parse_price("-3"), Some(dec!(-3)));
        assert_eq!(parse_price("1.5e2"), Some(dec!(150)));
        assert_eq!(parse_price("abc"), None);
    }
}
