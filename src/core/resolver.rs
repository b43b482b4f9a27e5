//! Quote resolution: cache lookup, provider fallback, corrections and
//! write-through.

use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::cache::QuoteCache;
use super::corrections::CorrectionTable;
use super::error::QuoteError;
use super::fallback::synthesize_quote;
use super::quote::{
    MIN_SYMBOL_LEN, ProviderQuote, Quote, QuoteProvider, SymbolInfo, normalize_symbol,
};
use super::symbols::fallback_symbols;

pub struct QuoteResolver {
    providers: Vec<Arc<dyn QuoteProvider>>,
    corrections: CorrectionTable,
    cache: Arc<QuoteCache>,
    synthesize_fallback: bool,
    provider_timeout: Option<Duration>,
}

impl QuoteResolver {
    /// `providers` are tried strictly in the given order.
    pub fn new(
        providers: Vec<Arc<dyn QuoteProvider>>,
        corrections: CorrectionTable,
        cache: Arc<QuoteCache>,
    ) -> Self {
        Self {
            providers,
            corrections,
            cache,
            synthesize_fallback: true,
            provider_timeout: None,
        }
    }

    /// Whether to synthesize an offline quote when every provider fails.
    /// When disabled such symbols resolve to [`QuoteError::Resolution`].
    pub fn with_synthesized_fallback(mut self, enabled: bool) -> Self {
        self.synthesize_fallback = enabled;
        self
    }

    /// Hard deadline for one provider's attempt, retries included.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = Some(timeout);
        self
    }

    pub fn cache(&self) -> &Arc<QuoteCache> {
        &self.cache
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolves one symbol.
    ///
    /// Only [`QuoteError::InvalidSymbol`] reaches the caller under the
    /// default configuration: provider failures fall through to the next
    /// provider and finally to a synthesized quote, which is corrected and
    /// cached like real data.
    #[instrument(name = "ResolveQuote", skip(self))]
    pub async fn resolve(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let symbol = normalize_symbol(symbol)?;

        // Held until the write-through so that a concurrent resolve of the
        // same symbol waits and then hits the cache.
        let _guard = self.cache.lock_symbol(&symbol).await;

        if let Some(cached) = self.cache.get(&symbol).await {
            debug!("Serving {} from cache", symbol);
            return Ok(cached);
        }

        let provisional = match self.fetch_from_providers(&symbol).await {
            Some(result) => result,
            None if self.synthesize_fallback => {
                warn!(
                    "All providers failed for {}, synthesizing offline quote",
                    symbol
                );
                synthesize_quote(&symbol, Utc::now())
            }
            None => return Err(QuoteError::Resolution { symbol }),
        };

        let quote = self.corrections.apply(&symbol, provisional);
        self.cache.put(&symbol, quote.clone()).await;

        info!(
            symbol = %quote.symbol,
            source = %quote.source,
            price = quote.current_price,
            pe_ratio = quote.pe_ratio,
            "Resolved quote"
        );
        Ok(quote)
    }

    async fn fetch_from_providers(&self, symbol: &str) -> Option<ProviderQuote> {
        for provider in &self.providers {
            let attempt = provider.fetch_quote(symbol);
            let result = match self.provider_timeout {
                Some(limit) => match tokio::time::timeout(limit, attempt).await {
                    Ok(result) => result,
                    Err(_) => Err(QuoteError::upstream(
                        provider.name(),
                        format!("Timed out after {limit:?}"),
                    )),
                },
                None => attempt.await,
            };

            match result {
                Ok(quote) => {
                    debug!(provider = provider.name(), "Provider returned quote for {}", symbol);
                    return Some(quote);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed for {}, trying next",
                        symbol
                    );
                }
            }
        }
        None
    }

    /// Resolves every symbol concurrently. Each symbol gets its own result;
    /// one failure never aborts the others. Output order follows the input.
    pub async fn resolve_all(&self, symbols: &[String]) -> Vec<(String, Result<Quote, QuoteError>)> {
        let futures = symbols.iter().map(|symbol| async move {
            let result = self.resolve(symbol).await;
            (symbol.clone(), result)
        });
        join_all(futures).await
    }

    /// Case-insensitive substring search over the exchange symbol list.
    /// Queries shorter than two characters return nothing without touching
    /// the network. Never fails.
    pub async fn search(&self, query: &str) -> Vec<SymbolInfo> {
        let query = query.trim();
        if query.chars().count() < MIN_SYMBOL_LEN {
            return Vec::new();
        }

        self.symbol_list()
            .await
            .into_iter()
            .filter(|info| info.matches(query))
            .collect()
    }

    async fn symbol_list(&self) -> Vec<SymbolInfo> {
        for provider in &self.providers {
            match provider.fetch_symbol_list().await {
                Ok(list) => return list,
                Err(e) => debug!(provider = provider.name(), error = %e, "No symbol list"),
            }
        }
        fallback_symbols()
    }
}
