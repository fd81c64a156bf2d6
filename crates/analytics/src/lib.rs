//! # Stockfolio Analytics Engine
//!
//! Quantitative metrics over a client's holdings and a window of recent
//! prices.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** this crate has no knowledge of external systems. It
//!   depends only on `core-types`; loading prices and holdings is the
//!   caller's job.
//! - **Stateless Calculation:** the `AnalyticsEngine` takes a `PriceWindow`
//!   and produces a result struct, which makes it easy to test.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: valuation, most-performing, most-stable and
//!   best-unowned searches.
//! - `Valuation`, `Performance`, `Stability`, `BestUnowned`: the result structs.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{BestUnowned, Performance, PositionValue, Stability, Valuation};
