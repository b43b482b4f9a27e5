//! Quote abstractions and core types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::error::QuoteError;

/// Minimum length of a ticker accepted by the resolver.
pub const MIN_SYMBOL_LEN: usize = 2;

/// Where a quote's numbers came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteSource {
    Provider(String),
    Synthesized,
}

impl Display for QuoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteSource::Provider(name) => write!(f, "{name}"),
            QuoteSource::Synthesized => write!(f, "offline"),
        }
    }
}

/// Provisional quote produced by one provider adapter, before correction
/// rules have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderQuote {
    pub symbol: String,
    pub company_name: String,
    pub current_price: f64,
    pub eps: f64,
    pub pe_ratio: f64,
    pub high_52_week: f64,
    pub low_52_week: f64,
    pub market_cap: f64,
    pub fetched_at: DateTime<Utc>,
    pub source: QuoteSource,
}

/// Normalized valuation snapshot for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub company_name: String,
    pub current_price: f64,
    pub eps: f64,
    pub pe_ratio: f64,
    #[serde(rename = "high52Week")]
    pub high_52_week: f64,
    #[serde(rename = "low52Week")]
    pub low_52_week: f64,
    pub market_cap: f64,
    pub last_updated: DateTime<Utc>,
    pub source: QuoteSource,
    /// Set when a correction rule overrode provider data.
    #[serde(default)]
    pub corrected: bool,
}

impl Quote {
    pub fn is_synthesized(&self) -> bool {
        self.source == QuoteSource::Synthesized
    }

    /// Age of this record relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.last_updated
    }
}

/// An entry of the exchange symbol list used by search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub name: String,
}

impl SymbolInfo {
    pub fn new(symbol: &str, name: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
        }
    }

    /// Case-insensitive substring match on symbol or name.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.symbol.to_lowercase().contains(&query) || self.name.to_lowercase().contains(&query)
    }
}

/// Uppercases and trims a ticker, rejecting anything shorter than
/// [`MIN_SYMBOL_LEN`].
pub fn normalize_symbol(symbol: &str) -> Result<String, QuoteError> {
    let normalized = symbol.trim().to_uppercase();
    if normalized.chars().count() < MIN_SYMBOL_LEN {
        return Err(QuoteError::InvalidSymbol(symbol.to_string()));
    }
    Ok(normalized)
}

/// One upstream quote vendor.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Short identifier used in logs and quote provenance.
    fn name(&self) -> &'static str;

    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, QuoteError>;

    /// Exchange symbol list for search. Vendors without a listing endpoint
    /// keep the default.
    async fn fetch_symbol_list(&self) -> Result<Vec<SymbolInfo>, QuoteError> {
        Err(QuoteError::upstream(
            self.name(),
            "symbol list is not supported",
        ))
    }
}
