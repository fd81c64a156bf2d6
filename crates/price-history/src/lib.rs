//! # Price History Store
//!
//! Turns the flat, symbol-grouped price log into per-symbol, newest-first
//! price series bounded to a requested number of days.
//!
//! ## Public API
//!
//! - `PriceHistory`: file-backed store; `load_window` opens, scans and closes
//!   the log on every call.
//! - `load_window_from_reader`: the same single-pass scan over any `io::Read`.
//! - `PriceHistoryError`: the specific error types that can be returned from this crate.

mod cursor;
pub mod error;
pub mod store;

pub use error::PriceHistoryError;
pub use store::{PriceHistory, load_window_from_reader, parse_price};
