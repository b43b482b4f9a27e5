//! The user's watchlist of tracked symbols and their last known quotes.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::QuoteError;
use super::quote::{Quote, normalize_symbol};
use super::resolver::QuoteResolver;
use crate::store::KeyValueStore;

/// Storage key of the serialized portfolio.
pub const PORTFOLIO_KEY: &str = "stock-portfolio";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub stocks: Vec<Quote>,
}

impl Portfolio {
    pub fn contains(&self, symbol: &str) -> bool {
        self.stocks.iter().any(|s| s.symbol == symbol)
    }

    /// True when any tracked quote is older than `validity` at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, validity: chrono::Duration) -> bool {
        self.stocks.iter().any(|s| s.age(now) >= validity)
    }

    pub fn stats(&self) -> PortfolioStats {
        let total_stocks = self.stocks.len();
        if total_stocks == 0 {
            return PortfolioStats::default();
        }

        let mut total_pe = 0.0;
        let mut highest = &self.stocks[0];
        let mut lowest = &self.stocks[0];
        for stock in &self.stocks {
            total_pe += stock.pe_ratio;
            if stock.pe_ratio > highest.pe_ratio {
                highest = stock;
            }
            if stock.pe_ratio < lowest.pe_ratio {
                lowest = stock;
            }
        }

        PortfolioStats {
            total_stocks,
            average_pe: total_pe / total_stocks as f64,
            highest_pe: Some(PeExtreme {
                symbol: highest.symbol.clone(),
                value: highest.pe_ratio,
            }),
            lowest_pe: Some(PeExtreme {
                symbol: lowest.symbol.clone(),
                value: lowest.pe_ratio,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeExtreme {
    pub symbol: String,
    pub value: f64,
}

/// Aggregate PE figures across the portfolio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioStats {
    pub total_stocks: usize,
    pub average_pe: f64,
    pub highest_pe: Option<PeExtreme>,
    pub lowest_pe: Option<PeExtreme>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(Quote),
    AlreadyTracked(String),
}

/// Per-symbol outcome of a portfolio refresh.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub refreshed: Vec<String>,
    pub synthesized: Vec<String>,
    /// Symbols that kept their previous quote, with the reason.
    pub failed: Vec<(String, QuoteError)>,
}

/// Portfolio store: owns the tracked list, persists it and asks the
/// resolver for quotes.
pub struct PortfolioTracker {
    resolver: Arc<QuoteResolver>,
    store: Arc<dyn KeyValueStore>,
    portfolio: Portfolio,
}

impl PortfolioTracker {
    /// Loads the saved portfolio. A missing or unreadable blob starts an
    /// empty portfolio.
    pub async fn load(resolver: Arc<QuoteResolver>, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let portfolio = match store.get(PORTFOLIO_KEY).await? {
            Some(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(error = %e, "Saved portfolio is unreadable, starting empty");
                Portfolio::default()
            }),
            None => Portfolio::default(),
        };
        debug!(stocks = portfolio.stocks.len(), "Loaded portfolio");

        Ok(Self {
            resolver,
            store,
            portfolio,
        })
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn stats(&self) -> PortfolioStats {
        self.portfolio.stats()
    }

    pub fn is_stale(&self) -> bool {
        self.portfolio
            .is_stale(Utc::now(), self.resolver.cache().validity())
    }

    async fn save(&self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.portfolio).context("Failed to serialize portfolio")?;
        self.store
            .put(PORTFOLIO_KEY, &bytes)
            .await
            .context("Failed to save portfolio")
    }

    /// Resolves and starts tracking `symbol`. Duplicates are reported
    /// without a fetch; an invalid symbol is an error.
    pub async fn add(&mut self, symbol: &str) -> Result<AddOutcome> {
        let symbol = normalize_symbol(symbol)?;
        if self.portfolio.contains(&symbol) {
            info!("{} is already in the portfolio", symbol);
            return Ok(AddOutcome::AlreadyTracked(symbol));
        }

        let quote = self.resolver.resolve(&symbol).await?;
        self.portfolio.stocks.push(quote.clone());
        self.save().await?;
        info!("Added {} to portfolio", quote.symbol);
        Ok(AddOutcome::Added(quote))
    }

    /// Stops tracking `symbol`. Returns whether it was tracked.
    pub async fn remove(&mut self, symbol: &str) -> Result<bool> {
        let symbol = symbol.trim().to_uppercase();
        let before = self.portfolio.stocks.len();
        self.portfolio.stocks.retain(|s| s.symbol != symbol);
        let removed = self.portfolio.stocks.len() != before;
        if removed {
            self.save().await?;
            info!("Removed {} from portfolio", symbol);
        }
        Ok(removed)
    }

    /// Re-resolves every tracked symbol concurrently. A symbol that fails
    /// keeps its previous quote; the others are unaffected.
    /// `update_callback` runs once per finished symbol.
    pub async fn refresh(&mut self, update_callback: &(dyn Fn() + Sync)) -> Result<RefreshReport> {
        let futures = self.portfolio.stocks.iter().map(|stock| {
            let resolver = Arc::clone(&self.resolver);
            async move {
                let result = resolver.resolve(&stock.symbol).await;
                update_callback();
                result
            }
        });
        let results = join_all(futures).await;

        let mut report = RefreshReport::default();
        for (stock, result) in self.portfolio.stocks.iter_mut().zip(results) {
            match result {
                Ok(quote) => {
                    if quote.is_synthesized() {
                        report.synthesized.push(quote.symbol.clone());
                    } else {
                        report.refreshed.push(quote.symbol.clone());
                    }
                    *stock = quote;
                }
                Err(e) => {
                    warn!(symbol = %stock.symbol, error = %e, "Keeping previous quote");
                    report.failed.push((stock.symbol.clone(), e));
                }
            }
        }

        self.save().await?;
        Ok(report)
    }
}
