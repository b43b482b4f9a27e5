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

pub const TWELVE_DATA_BASE_URL: &str = "https://api.twelvedata.com";

const NAME: &str = "TWELVEDATA";

/// Twelve Data REST API. Needs an API key; a quote takes two calls, one for
/// the price and one for the fundamentals.
pub struct TwelveDataProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl TwelveDataProvider {
    pub fn new(
        base_url: &str,
        api_key: &str,
        settings: ProviderSettings,
    ) -> Result<Self, QuoteError> {
        Ok(TwelveDataProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            client: http_client(NAME, &settings)?,
            settings,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        listing: &str,
    ) -> Result<T, QuoteError> {
        let url = endpoint(
            NAME,
            &self.base_url,
            path,
            &[("symbol", listing), ("apikey", self.api_key.as_str())],
        )?;
        debug!("Requesting {} data for {}", path, listing);
        get_json(NAME, &self.settings, || self.client.get(url.clone())).await
    }
}

#[derive(Deserialize, Debug)]
struct TwelvePrice {
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
struct FiftyTwoWeek {
    #[serde(default, deserialize_with = "lenient_f64")]
    high: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    low: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct TwelveQuote {
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pe_ratio: Option<f64>,
    #[serde(default)]
    fifty_two_week: FiftyTwoWeek,
    #[serde(default, deserialize_with = "lenient_f64")]
    market_cap: Option<f64>,
}

#[async_trait]
impl QuoteProvider for TwelveDataProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(name = "TwelveDataQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, QuoteError> {
        let listing = format!("{symbol}.NS");

        let price: TwelvePrice = self.get("price", &listing).await?;
        // Error payloads arrive with HTTP 200 and no price field.
        let current_price = price
            .price
            .filter(|p| *p > 0.0)
            .ok_or_else(|| QuoteError::upstream(NAME, format!("Missing price for {symbol}")))?;

        let info: TwelveQuote = self.get("quote", &listing).await?;
        let pe_ratio = info.pe_ratio.unwrap_or_default();

        Ok(ProviderQuote {
            symbol: symbol.to_string(),
            company_name: info.name.unwrap_or_else(|| default_company_name(symbol)),
            current_price,
            eps: derive_eps(current_price, pe_ratio),
            pe_ratio,
            high_52_week: info.fifty_two_week.high.unwrap_or_default(),
            low_52_week: info.fifty_two_week.low.unwrap_or_default(),
            market_cap: info.market_cap.unwrap_or_default(),
            fetched_at: Utc::now(),
            source: QuoteSource::Provider(NAME.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "demo";

    async fn mount(server: &MockServer, endpoint: &str, listing: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(query_param("symbol", listing))
            .and(query_param("apikey", KEY))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    fn provider(base_url: &str) -> TwelveDataProvider {
        TwelveDataProvider::new(
            base_url,
            KEY,
            ProviderSettings {
                retries: 0,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "/price", "ITC.NS", 200, r#"{"price": "450.00"}"#).await;
        mount(
            &mock_server,
            "/quote",
            "ITC.NS",
            200,
            r#"{
                "symbol": "ITC",
                "name": "ITC Limited",
                "pe_ratio": "25",
                "fifty_two_week": {"high": "499.70", "low": "399.35"},
                "market_cap": "5610000000000"
            }"#,
        )
        .await;

        let quote = provider(&mock_server.uri()).fetch_quote("ITC").await.unwrap();
        assert_eq!(quote.company_name, "ITC Limited");
        assert_eq!(quote.current_price, 450.0);
        assert_eq!(quote.pe_ratio, 25.0);
        assert_eq!(quote.eps, 18.0);
        assert_eq!(quote.high_52_week, 499.7);
        assert_eq!(quote.low_52_week, 399.35);
        assert_eq!(quote.market_cap, 5_610_000_000_000.0);
        assert_eq!(quote.source, QuoteSource::Provider("TWELVEDATA".to_string()));
    }

    #[tokio::test]
    async fn test_error_payload_is_upstream_error() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/price",
            "ZZZZ.NS",
            200,
            r#"{"code": 400, "message": "symbol not found", "status": "error"}"#,
        )
        .await;

        let err = provider(&mock_server.uri())
            .fetch_quote("ZZZZ")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            QuoteError::upstream("TWELVEDATA", "Missing price for ZZZZ")
        );
    }

    #[tokio::test]
    async fn test_failed_info_call_fails_the_quote() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "/price", "ITC.NS", 200, r#"{"price": 450}"#).await;
        mount(&mock_server, "/quote", "ITC.NS", 429, "").await;

        let err = provider(&mock_server.uri())
            .fetch_quote("ITC")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTP error: 429"));
    }

    #[tokio::test]
    async fn test_missing_range_defaults_to_zero() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "/price", "ITC.NS", 200, r#"{"price": 450}"#).await;
        mount(&mock_server, "/quote", "ITC.NS", 200, r#"{"name": "ITC Limited"}"#).await;

        let quote = provider(&mock_server.uri()).fetch_quote("ITC").await.unwrap();
        assert_eq!(quote.high_52_week, 0.0);
        assert_eq!(quote.low_52_week, 0.0);
        assert_eq!(quote.pe_ratio, 0.0);
        assert_eq!(quote.eps, 0.0);
    }
}
