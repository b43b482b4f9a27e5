//! Deterministic offline quotes, used when no provider is reachable.

use chrono::{DateTime, Utc};

use super::quote::{ProviderQuote, QuoteSource};

const NAME_PREFIXES: [&str; 7] = [
    "Tech", "Global", "India", "National", "Bharat", "Future", "Prime",
];
const NAME_SUFFIXES: [&str; 7] = [
    "Solutions",
    "Enterprises",
    "Industries",
    "Technologies",
    "Corp",
    "Limited",
    "Motors",
];

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum of the symbol's byte values.
pub fn symbol_seed(symbol: &str) -> u32 {
    symbol
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_add(u32::from(b)))
}

fn company_name(symbol: &str) -> String {
    let bytes = symbol.as_bytes();
    let first = bytes.first().copied().unwrap_or_default() as usize;
    let last = bytes.last().copied().unwrap_or_default() as usize;
    format!(
        "{} {} {}",
        NAME_PREFIXES[first % NAME_PREFIXES.len()],
        symbol,
        NAME_SUFFIXES[last % NAME_SUFFIXES.len()]
    )
}

/// Builds a plausible quote for `symbol` from its seed alone. The same
/// symbol always yields the same numbers; only `fetched_at` differs.
pub fn synthesize_quote(symbol: &str, now: DateTime<Utc>) -> ProviderQuote {
    let seed = symbol_seed(symbol);

    let cents = |factor: u32| f64::from(seed.wrapping_mul(factor) % 100) / 100.0;

    let price = round2(100.0 + f64::from(seed % 900) + cents(37));
    let eps = round2(5.0 + f64::from(seed % 45) + cents(53));

    ProviderQuote {
        symbol: symbol.to_string(),
        company_name: company_name(symbol),
        current_price: price,
        eps,
        pe_ratio: round2(price / eps),
        high_52_week: round2(price * 1.2),
        low_52_week: round2(price * 0.8),
        market_cap: (price * 1_000_000.0).round(),
        fetched_at: now,
        source: QuoteSource::Synthesized,
    }
}
