//! # Stockfolio Engine
//!
//! The orchestrator that wires the holdings store, the price log, the
//! portfolio validator and the analytics calculations into the operations a
//! client-facing surface exposes.
//!
//! ## Public API
//!
//! - `PortfolioService`: create, replace and partially update portfolios;
//!   valuation, most-performing, most-stable and best-unowned queries;
//!   client and holding listings.
//! - `EngineError`: the invalid-argument / not-found / conflict /
//!   infrastructure taxonomy returned by every operation.

pub mod error;
pub mod service;

pub use error::{EngineError, INFRASTRUCTURE_MESSAGE};
pub use service::PortfolioService;
