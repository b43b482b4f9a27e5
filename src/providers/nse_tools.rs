use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::util::{
    ProviderSettings, default_company_name, derive_pe_ratio, endpoint, get_json, http_client,
    lenient_f64,
};
use crate::core::error::QuoteError;
use crate::core::quote::{ProviderQuote, QuoteProvider, QuoteSource, SymbolInfo};
use crate::core::symbols::fallback_symbols;

pub const NSE_TOOLS_BASE_URL: &str = "https://api.nsetools.in/nse-data";

const NAME: &str = "NSETOOLS";

/// Keyless NSE quote API. Always the last entry of the provider chain.
pub struct NseToolsProvider {
    base_url: String,
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl NseToolsProvider {
    pub fn new(base_url: &str, settings: ProviderSettings) -> Result<Self, QuoteError> {
        Ok(NseToolsProvider {
            base_url: base_url.to_string(),
            client: http_client(NAME, &settings)?,
            settings,
        })
    }
}

#[derive(Deserialize, Debug)]
struct NseQuoteResponse {
    data: Option<NseQuote>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NseQuote {
    company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    last_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    close_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    eps: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    high52: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    low52: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    market_cap: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct NseListResponse {
    symbols: Vec<SymbolInfo>,
}

#[async_trait]
impl QuoteProvider for NseToolsProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(name = "NseToolsQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, QuoteError> {
        let url = endpoint(NAME, &self.base_url, "quote", &[("symbol", symbol)])?;
        debug!("Requesting quote data from {}", url);

        let response: NseQuoteResponse =
            get_json(NAME, &self.settings, || self.client.get(url.clone())).await?;

        let stock = response
            .data
            .ok_or_else(|| QuoteError::upstream(NAME, format!("No quote data for {symbol}")))?;

        let current_price = stock
            .last_price
            .or(stock.close_price)
            .filter(|p| *p > 0.0)
            .ok_or_else(|| QuoteError::upstream(NAME, format!("Missing price for {symbol}")))?;
        let eps = stock.eps.unwrap_or_default();

        Ok(ProviderQuote {
            symbol: symbol.to_string(),
            company_name: stock
                .company_name
                .unwrap_or_else(|| default_company_name(symbol)),
            current_price,
            eps,
            pe_ratio: derive_pe_ratio(current_price, eps),
            high_52_week: stock.high52.unwrap_or_default(),
            low_52_week: stock.low52.unwrap_or_default(),
            market_cap: stock.market_cap.unwrap_or_default(),
            fetched_at: Utc::now(),
            source: QuoteSource::Provider(NAME.to_string()),
        })
    }

    /// Never fails: any upstream problem degrades to the built-in list.
    async fn fetch_symbol_list(&self) -> Result<Vec<SymbolInfo>, QuoteError> {
        let fetched: Result<NseListResponse, QuoteError> = async {
            let url = endpoint(NAME, &self.base_url, "list", &[])?;
            get_json(NAME, &self.settings, || self.client.get(url.clone())).await
        }
        .await;

        match fetched {
            Ok(list) if !list.symbols.is_empty() => Ok(list.symbols),
            Ok(_) => {
                warn!("Empty symbol list from {}, using built-in list", NAME);
                Ok(fallback_symbols())
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch symbol list, using built-in list");
                Ok(fallback_symbols())
            }
        }
    }
}
