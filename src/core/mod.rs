//! Core quote resolution and portfolio abstractions

pub mod cache;
pub mod config;
pub mod corrections;
pub mod error;
pub mod fallback;
pub mod log;
pub mod portfolio;
pub mod quote;
pub mod resolver;
pub mod symbols;

// Re-export main types for cleaner imports
pub use cache::QuoteCache;
pub use corrections::{Correction, CorrectionTable};
pub use error::QuoteError;
pub use portfolio::{Portfolio, PortfolioStats, PortfolioTracker};
pub use quote::{ProviderQuote, Quote, QuoteProvider, QuoteSource, SymbolInfo};
pub use resolver::QuoteResolver;
