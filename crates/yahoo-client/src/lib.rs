//! Client for the Yahoo Finance fundamentals time series endpoint.

mod error;

pub use error::{FetchError, FetchResult};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use metrics_core::TimeseriesPayload;
use reqwest::{Client, Url};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
const TIMESERIES_PATH: [&str; 5] = ["ws", "fundamentals-timeseries", "v1", "finance", "timeseries"];

/// Years of history requested before the current year.
const LOOKBACK_YEARS: i32 = 12;

/// Source of raw fundamentals time series for a ticker.
///
/// Implemented by [`YahooClient`]; the server only sees this trait.
#[async_trait]
pub trait TimeseriesSource: Send + Sync {
    async fn fetch_timeseries(
        &self,
        ticker: &str,
        identifiers: &[&str],
    ) -> FetchResult<TimeseriesPayload>;

    fn source_name(&self) -> &'static str;
}

/// Configuration for the upstream connection
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Clone)]
pub struct YahooClient {
    config: YahooConfig,
    client: Client,
}

impl YahooClient {
    pub fn new(config: YahooConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Endpoint URL for a ticker; the ticker is percent-encoded as a path segment.
    pub fn timeseries_url(&self, ticker: &str) -> FetchResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.config.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(TIMESERIES_PATH)
            .push(ticker);
        Ok(url)
    }

    /// Fetch every requested series for `ticker` in a single call.
    pub async fn get_timeseries(
        &self,
        ticker: &str,
        identifiers: &[&str],
    ) -> FetchResult<TimeseriesPayload> {
        let url = self.timeseries_url(ticker)?;
        let query = timeseries_query(identifiers, Utc::now());

        tracing::debug!("Requesting {} series for {} from {}", identifiers.len(), ticker, url);

        let response = self.client.get(url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.bytes().await?;
        let payload: TimeseriesPayload = serde_json::from_slice(&body)?;

        if let Some(err) = &payload.timeseries.error {
            tracing::warn!("Upstream reported an error for {}: {}", ticker, err);
        }

        Ok(payload)
    }
}

#[async_trait]
impl TimeseriesSource for YahooClient {
    async fn fetch_timeseries(
        &self,
        ticker: &str,
        identifiers: &[&str],
    ) -> FetchResult<TimeseriesPayload> {
        self.get_timeseries(ticker, identifiers).await
    }

    fn source_name(&self) -> &'static str {
        "yahoo"
    }
}

/// Query parameters for one batched, unmerged, unpadded request covering
/// January 1st twelve years back through January 1st of next year.
pub fn timeseries_query(identifiers: &[&str], now: DateTime<Utc>) -> Vec<(&'static str, String)> {
    let year = now.year();
    vec![
        ("type", identifiers.join(",")),
        ("period1", year_start_epoch(year - LOOKBACK_YEARS).to_string()),
        ("period2", year_start_epoch(year + 1).to_string()),
        ("merge", "false".to_string()),
        ("padTimeSeries", "false".to_string()),
    ]
}

fn year_start_epoch(year: i32) -> i64 {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}
