pub mod error;
pub mod holding;
pub mod symbol;
pub mod window;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use holding::{Client, ClientId, Holding, PortfolioEntry, contains_symbol, find_by_symbol};
pub use symbol::{Symbol, SymbolSet};
pub use window::PriceWindow;
