pub mod nse_tools;
pub mod rapid_api;
pub mod twelve_data;
pub mod util;

use std::sync::Arc;
use tracing::debug;

use crate::core::config::AppConfig;
use crate::core::error::QuoteError;
use crate::core::quote::QuoteProvider;
use nse_tools::NseToolsProvider;
use rapid_api::RapidApiProvider;
use twelve_data::TwelveDataProvider;

/// Providers in priority order: every keyed vendor that has a key, then the
/// keyless NSE tools API.
pub fn provider_chain(config: &AppConfig) -> Result<Vec<Arc<dyn QuoteProvider>>, QuoteError> {
    let settings = config.provider_settings();
    let providers = &config.providers;
    let mut chain: Vec<Arc<dyn QuoteProvider>> = Vec::new();

    if let Some(key) = providers.rapid_api.api_key.as_deref() {
        chain.push(Arc::new(RapidApiProvider::new(
            &providers.rapid_api.base_url,
            &providers.rapid_api.host,
            key,
            settings.clone(),
        )?));
    }
    if let Some(key) = providers.twelve_data.api_key.as_deref() {
        chain.push(Arc::new(TwelveDataProvider::new(
            &providers.twelve_data.base_url,
            key,
            settings.clone(),
        )?));
    }
    chain.push(Arc::new(NseToolsProvider::new(
        &providers.nse_tools.base_url,
        settings,
    )?));

    debug!(
        providers = ?chain.iter().map(|p| p.name()).collect::<Vec<_>>(),
        "Configured provider chain"
    );
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(chain: &[Arc<dyn QuoteProvider>]) -> Vec<&'static str> {
        chain.iter().map(|p| p.name()).collect()
    }

    #[test]
    fn test_no_keys_uses_keyless_provider_only() {
        let chain = provider_chain(&AppConfig::default()).unwrap();
        assert_eq!(names(&chain), vec!["NSETOOLS"]);
    }

    #[test]
    fn test_keyed_providers_come_first() {
        let mut config = AppConfig::default();
        config.providers.twelve_data.api_key = Some("td".to_string());
        assert_eq!(names(&provider_chain(&config).unwrap()), vec!["TWELVEDATA", "NSETOOLS"]);

        config.providers.rapid_api.api_key = Some("rk".to_string());
        assert_eq!(
            names(&provider_chain(&config).unwrap()),
            vec!["RAPIDAPI", "TWELVEDATA", "NSETOOLS"]
        );
    }
}
