use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::util::{
    ProviderSettings, default_company_name, derive_eps, endpoint, get_json, http_client,
    lenient_f64,
};
use crate::core::error::QuoteError;
use crate::core::quote::{ProviderQuote, QuoteProvider, QuoteSource};

pub const RAPID_API_BASE_URL: &str = "https://real-time-finance-data.p.rapidapi.com";
pub const RAPID_API_HOST: &str = "real-time-finance-data.p.rapidapi.com";

const NAME: &str = "RAPIDAPI";

/// Real-time finance data API behind RapidAPI. Needs an API key.
pub struct RapidApiProvider {
    base_url: String,
    host: String,
    api_key: String,
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl RapidApiProvider {
    pub fn new(
        base_url: &str,
        host: &str,
        api_key: &str,
        settings: ProviderSettings,
    ) -> Result<Self, QuoteError> {
        Ok(RapidApiProvider {
            base_url: base_url.to_string(),
            host: host.to_string(),
            api_key: api_key.to_string(),
            client: http_client(NAME, &settings)?,
            settings,
        })
    }
}

#[derive(Deserialize, Debug)]
struct RapidQuoteResponse {
    data: Option<RapidQuote>,
}

#[derive(Deserialize, Debug)]
struct RapidQuote {
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pe_ratio: Option<f64>,
    #[serde(rename = "52_week_high", default, deserialize_with = "lenient_f64")]
    high_52_week: Option<f64>,
    #[serde(rename = "52_week_low", default, deserialize_with = "lenient_f64")]
    low_52_week: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    market_cap: Option<f64>,
}

#[async_trait]
impl QuoteProvider for RapidApiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(name = "RapidApiQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, QuoteError> {
        let listing = format!("{symbol}.NS");
        let url = endpoint(
            NAME,
            &self.base_url,
            "stock-quote",
            &[("symbol", listing.as_str()), ("language", "en")],
        )?;
        debug!("Requesting quote data from {}", url);

        let response: RapidQuoteResponse = get_json(NAME, &self.settings, || {
            self.client
                .get(url.clone())
                .header("X-RapidAPI-Key", &self.api_key)
                .header("X-RapidAPI-Host", &self.host)
        })
        .await?;

        let stock = response
            .data
            .ok_or_else(|| QuoteError::upstream(NAME, format!("No quote data for {symbol}")))?;
        let current_price = stock
            .price
            .filter(|p| *p > 0.0)
            .ok_or_else(|| QuoteError::upstream(NAME, format!("Missing price for {symbol}")))?;
        let pe_ratio = stock.pe_ratio.unwrap_or_default();

        Ok(ProviderQuote {
            symbol: symbol.to_string(),
            company_name: stock.name.unwrap_or_else(|| default_company_name(symbol)),
            current_price,
            eps: derive_eps(current_price, pe_ratio),
            pe_ratio,
            high_52_week: stock.high_52_week.unwrap_or_default(),
            low_52_week: stock.low_52_week.unwrap_or_default(),
            market_cap: stock.market_cap.unwrap_or_default(),
            fetched_at: Utc::now(),
            source: QuoteSource::Provider(NAME.to_string()),
        })
    }
}
