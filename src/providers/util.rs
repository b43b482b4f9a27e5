use anyhow::Error;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::core::error::QuoteError;

const USER_AGENT: &str = "valtrack/0.1";

/// HTTP behaviour shared by every adapter.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Upper bound on a single upstream call.
    pub timeout: Duration,
    /// Extra attempts after a transport failure. HTTP status errors are not retried.
    pub retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 2,
            retry_delay_ms: 500,
        }
    }
}

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(anyhow::Error::from) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

pub(crate) fn http_client(
    provider: &'static str,
    settings: &ProviderSettings,
) -> Result<reqwest::Client, QuoteError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(settings.timeout)
        .build()
        .map_err(|e| QuoteError::upstream(provider, format!("Failed to build HTTP client: {e}")))
}

pub(crate) fn endpoint(
    provider: &'static str,
    base_url: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<reqwest::Url, QuoteError> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), path);
    reqwest::Url::parse_with_params(&url, params)
        .map_err(|e| QuoteError::upstream(provider, format!("Invalid URL {url}: {e}")))
}

/// Sends the request built by `build`, retrying transport failures, and
/// parses a successful body as JSON.
pub(crate) async fn get_json<T, F>(
    provider: &'static str,
    settings: &ProviderSettings,
    build: F,
) -> Result<T, QuoteError>
where
    T: DeserializeOwned,
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = with_retry(|| build().send(), settings.retries, settings.retry_delay_ms)
        .await
        .map_err(|e| QuoteError::upstream(provider, format!("Request error: {e}")))?;

    let status = response.status();
    debug!(provider, %status, "Received upstream response");
    if !status.is_success() {
        return Err(QuoteError::upstream(provider, format!("HTTP error: {status}")));
    }

    let text = response
        .text()
        .await
        .map_err(|e| QuoteError::upstream(provider, format!("Failed to read response: {e}")))?;

    serde_json::from_str(&text).map_err(|e| {
        debug!(provider, response = %text, "Failed to parse upstream response");
        QuoteError::upstream(provider, format!("Failed to parse response: {e}"))
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Vendors send numbers either as JSON numbers or as strings such as
/// `"1,234.50"`. Anything unparseable reads as absent.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            NumberOrText::Number(n) => Some(n),
            NumberOrText::Text(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        })
        .filter(|n| n.is_finite()))
}

/// `price / eps` rounded to two places, or 0 when eps is not positive.
pub(crate) fn derive_pe_ratio(price: f64, eps: f64) -> f64 {
    if eps > 0.0 {
        crate::core::fallback::round2(price / eps)
    } else {
        0.0
    }
}

/// `price / pe` rounded to two places, or 0 when pe is not positive.
pub(crate) fn derive_eps(price: f64, pe_ratio: f64) -> f64 {
    if pe_ratio > 0.0 {
        crate::core::fallback::round2(price / pe_ratio)
    } else {
        0.0
    }
}

pub(crate) fn default_company_name(symbol: &str) -> String {
    format!("{symbol} Ltd.")
}
