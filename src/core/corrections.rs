//! Manually curated overrides for instruments whose upstream fundamentals
//! are known to be wrong.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use super::quote::{ProviderQuote, Quote};

/// Override values for one symbol. Any field left as `None` keeps the
/// provider's value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct Correction {
    pub pe_ratio: Option<f64>,
    pub high_52_week: Option<f64>,
    pub low_52_week: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CorrectionTable {
    rules: HashMap<String, Correction>,
}

impl CorrectionTable {
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Adds or replaces the rule for `symbol`. Keys are stored uppercase.
    pub fn with_rule(mut self, symbol: &str, correction: Correction) -> Self {
        self.rules.insert(symbol.to_uppercase(), correction);
        self
    }

    pub fn extend<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = (String, Correction)>,
    {
        for (symbol, correction) in rules {
            self.rules.insert(symbol.to_uppercase(), correction);
        }
        self
    }

    pub fn get(&self, symbol: &str) -> Option<&Correction> {
        self.rules.get(&symbol.to_uppercase())
    }

    /// Turns a provisional provider quote into a final [`Quote`], overriding
    /// any field the table has a rule for. A fixed PE also rewrites eps as
    /// `price / pe` so the pair stays consistent.
    pub fn apply(&self, symbol: &str, result: ProviderQuote) -> Quote {
        let mut quote = Quote {
            symbol: result.symbol,
            company_name: result.company_name,
            current_price: result.current_price,
            eps: result.eps,
            pe_ratio: result.pe_ratio,
            high_52_week: result.high_52_week,
            low_52_week: result.low_52_week,
            market_cap: result.market_cap,
            last_updated: result.fetched_at,
            source: result.source,
            corrected: false,
        };

        let Some(correction) = self.get(symbol) else {
            return quote;
        };

        if let Some(pe) = correction.pe_ratio {
            quote.pe_ratio = pe;
            quote.eps = if pe > 0.0 {
                quote.current_price / pe
            } else {
                0.0
            };
        }
        if let Some(high) = correction.high_52_week {
            quote.high_52_week = high;
        }
        if let Some(low) = correction.low_52_week {
            quote.low_52_week = low;
        }
        quote.corrected = true;

        warn!(
            symbol = %quote.symbol,
            correction = ?correction,
            "Correction rule active, overriding provider data"
        );
        quote
    }
}

impl Default for CorrectionTable {
    /// The built-in rules.
    fn default() -> Self {
        Self::empty()
            .with_rule(
                "HDFCBANK",
                Correction {
                    pe_ratio: Some(19.5),
                    ..Default::default()
                },
            )
            .with_rule(
                "NESTLEIND",
                Correction {
                    high_52_week: Some(2778.00),
                    low_52_week: Some(2110.00),
                    ..Default::default()
                },
            )
    }
}
