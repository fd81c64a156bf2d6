use crate::error::PriceHistoryError;
use csv::{StringRecord, StringRecordsIntoIter};
use std::io::Read;
use std::iter::Peekable;

/// A forward-only cursor over the records of a price log.
///
/// Exposes the next record and a peek at the symbol of the record after it,
/// which is all the lookahead needed to find group boundaries in a single pass.
/// Blank records are never surfaced.
pub(crate) struct LogCursor<R: Read> {
    records: Peekable<StringRecordsIntoIter<R>>,
}

impl<R: Read> LogCursor<R> {
    pub(crate) fn new(reader: R) -> Self {
        let records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_records()
            .peekable();
        Self { records }
    }

    /// Consumes and returns the next non-blank record.
    pub(crate) fn next_record(&mut self) -> Option<Result<StringRecord, PriceHistoryError>> {
        self.skip_blank();
        self.records.next().map(|r| r.map_err(PriceHistoryError::from))
    }

    /// The symbol of the next non-blank record, without consuming it.
    ///
    /// Returns `None` at end of log and also when the next read failed; the
    /// failure is left in place so that `next_record` reports it.
    pub(crate) fn peek_symbol(&mut self) -> Option<&str> {
        self.skip_blank();
        match self.records.peek() {
            Some(Ok(record)) => record.get(0),
            _ => None,
        }
    }

    /// Consumes every upcoming record that belongs to `symbol`'s group,
    /// leaving the cursor on the first record of the next group.
    /// Skipped rows are not parsed beyond their symbol field.
    pub(crate) fn skip_group(&mut self, symbol: &str) -> usize {
        let mut skipped = 0;
        while self.peek_symbol() == Some(symbol) {
            self.records.next();
            skipped += 1;
        }
        skipped
    }

    fn skip_blank(&mut self) {
        while let Some(Ok(record)) = self.records.peek() {
            if record.get(0).is_some_and(|s| !s.is_empty()) {
                break;
            }
            self.records.next();
        }
    }
}
