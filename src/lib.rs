pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{CorrectionTable, PortfolioTracker, QuoteCache, QuoteResolver};
use crate::store::{DiskStore, KeyValueStore};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Commands that need a loaded config and a resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Quote(String),
    Add(String),
    Remove(String),
    List,
    Refresh,
    Search(String),
}

pub fn build_resolver(config: &AppConfig) -> Result<QuoteResolver> {
    let cache = Arc::new(QuoteCache::with_validity(config.cache_validity()?));
    let corrections = CorrectionTable::default().extend(config.corrections.clone());

    Ok(
        QuoteResolver::new(providers::provider_chain(config)?, corrections, cache)
            .with_synthesized_fallback(config.synthesize_fallback)
            .with_provider_timeout(config.provider_deadline()?),
    )
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("valtrack starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let resolver = Arc::new(build_resolver(&config)?);
    debug!(providers = ?resolver.provider_names(), "Resolver ready");

    match command {
        AppCommand::Quote(symbol) => cli::quote::run(&resolver, &symbol).await,
        AppCommand::Search(query) => cli::search::run(&resolver, &query).await,
        AppCommand::Add(symbol) => {
            let mut tracker = open_tracker(&config, resolver).await?;
            cli::portfolio::add(&mut tracker, &symbol).await
        }
        AppCommand::Remove(symbol) => {
            let mut tracker = open_tracker(&config, resolver).await?;
            cli::portfolio::remove(&mut tracker, &symbol).await
        }
        AppCommand::List => {
            let mut tracker = open_tracker(&config, resolver).await?;
            cli::portfolio::list(&mut tracker).await
        }
        AppCommand::Refresh => {
            let mut tracker = open_tracker(&config, resolver).await?;
            cli::portfolio::refresh(&mut tracker).await
        }
    }
}

async fn open_tracker(config: &AppConfig, resolver: Arc<QuoteResolver>) -> Result<PortfolioTracker> {
    let data_path = config.default_data_path()?;
    debug!("Opening portfolio store at {}", data_path.display());
    let store: Arc<dyn KeyValueStore> = Arc::new(DiskStore::open(&data_path)?);
    PortfolioTracker::load(resolver, store).await
}
