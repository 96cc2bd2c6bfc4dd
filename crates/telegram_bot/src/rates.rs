//! Currency rates, fetched on demand from an HTTP endpoint.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const DEFAULT_RATES_URL: &str = "https://open.er-api.com/v6/latest";

#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("rate service answered {0}")]
    Status(StatusCode),
    #[error("no {quote} rate for {base}")]
    MissingQuote { base: String, quote: String },
}

/// Source of conversion rates. `fetch_rate("USD", "RUB")` is the price of one
/// USD in RUB.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64, RateError>;
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, f64>,
}

/// [`RateFetcher`] backed by an `{url}/{BASE}` JSON endpoint answering
/// `{"rates": {"RUB": 92.5, ...}}`.
#[derive(Clone, Debug)]
pub struct HttpRateFetcher {
    client: Client,
    base_url: String,
}

impl HttpRateFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RateError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, base: &str) -> String {
        format!("{}/{}", self.base_url, base.to_ascii_uppercase())
    }
}

#[async_trait]
impl RateFetcher for HttpRateFetcher {
    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64, RateError> {
        let resp = self.client.get(self.url(base)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RateError::Status(status));
        }

        let body = resp.json::<LatestRates>().await?;
        body.rates
            .get(&quote.to_ascii_uppercase())
            .copied()
            .filter(|rate| rate.is_finite())
            .ok_or_else(|| RateError::MissingQuote {
                base: base.to_string(),
                quote: quote.to_string(),
            })
    }
}

/// Two-line USD/EUR → RUB summary.
pub(crate) async fn rub_summary(fetcher: &dyn RateFetcher) -> Result<String, RateError> {
    let usd = fetcher.fetch_rate("USD", "RUB").await?;
    let eur = fetcher.fetch_rate("EUR", "RUB").await?;
    Ok(format_rates(usd, eur))
}

pub(crate) fn format_rates(usd: f64, eur: f64) -> String {
    format!("1 USD - {usd:.2} RUB\n1 EUR - {eur:.2} RUB")
}
