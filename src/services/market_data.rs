use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use url::Url;

/// History ranges the chart endpoint understands.
pub const HISTORY_PERIODS: &[&str] = &["1mo", "3mo", "6mo", "1y", "2y", "5y", "ytd", "max"];
pub const DEFAULT_HISTORY_PERIOD: &str = "6mo";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) portfolio-backend/0.1";

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Provider error for {symbol}: {message}")]
    Provider { symbol: String, message: String },
    #[error("No price data for {0}")]
    NoData(String),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(e: reqwest::Error) -> Self {
        MarketDataError::Network(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockInfo {
    pub name: String,
    pub sector: String,
    pub currency: String,
}

impl StockInfo {
    /// Placeholder metadata used whenever the provider cannot tell us more.
    pub fn fallback(symbol: &str) -> Self {
        Self {
            name: symbol.to_string(),
            sector: "Unknown".to_string(),
            currency: "USD".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Source of live prices, instrument metadata and closing-price history.
///
/// Only `fetch_price` reports failure; metadata and history degrade to
/// placeholders and empty series.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, MarketDataError>;

    async fn fetch_metadata(&self, symbol: &str) -> StockInfo;

    async fn fetch_history(&self, symbol: &str, period: &str) -> Vec<PricePoint>;
}

// ── Yahoo Finance chart API ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    currency: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    asset_profile: Option<AssetProfile>,
}

#[derive(Debug, Deserialize)]
struct AssetProfile {
    sector: Option<String>,
}

fn parse_chart(symbol: &str, body: &str) -> Result<ChartResult, MarketDataError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| MarketDataError::Provider {
            symbol: symbol.to_string(),
            message: format!("Unexpected chart payload: {e}"),
        })?;

    if let Some(err) = response.chart.error {
        return Err(MarketDataError::Provider {
            symbol: symbol.to_string(),
            message: format!(
                "{}: {}",
                err.code.unwrap_or_else(|| "Error".into()),
                err.description.unwrap_or_default()
            ),
        });
    }

    response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| MarketDataError::NoData(symbol.to_string()))
}

/// Latest close of the session, falling back to the quoted market price.
fn latest_price(symbol: &str, chart: &ChartResult) -> Result<f64, MarketDataError> {
    let last_close = chart
        .indicators
        .quote
        .first()
        .and_then(|q| q.close.iter().rev().find_map(|c| *c));

    match last_close.or(chart.meta.regular_market_price) {
        Some(price) if price > 0.0 && price.is_finite() => Ok(price),
        _ => Err(MarketDataError::NoData(symbol.to_string())),
    }
}

fn closing_series(chart: &ChartResult) -> Vec<PricePoint> {
    let closes = match chart.indicators.quote.first() {
        Some(q) => &q.close,
        None => return Vec::new(),
    };

    let mut points: Vec<PricePoint> = chart
        .timestamp
        .iter()
        .zip(closes.iter())
        .filter_map(|(ts, close)| {
            let close = (*close)?;
            let date = chrono::DateTime::from_timestamp(*ts, 0)?.date_naive();
            Some(PricePoint { date, close })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

fn stock_info(symbol: &str, chart: &ChartResult, sector: Option<String>) -> StockInfo {
    let fallback = StockInfo::fallback(symbol);
    StockInfo {
        name: chart
            .meta
            .long_name
            .clone()
            .or_else(|| chart.meta.short_name.clone())
            .unwrap_or(fallback.name),
        sector: sector.unwrap_or(fallback.sector),
        currency: chart.meta.currency.clone().unwrap_or(fallback.currency),
    }
}

pub struct YahooMarketData {
    http_client: Client,
    base_url: Url,
}

impl YahooMarketData {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, MarketDataError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MarketDataError::Network("Base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn chart(&self, symbol: &str, range: &str) -> Result<ChartResult, MarketDataError> {
        let url = self.endpoint(&["v8", "finance", "chart", symbol])?;
        let body = self
            .http_client
            .get(url)
            .query(&[("range", range), ("interval", "1d")])
            .send()
            .await?
            .text()
            .await?;
        parse_chart(symbol, &body)
    }

    async fn sector(&self, symbol: &str) -> Option<String> {
        let url = self
            .endpoint(&["v10", "finance", "quoteSummary", symbol])
            .ok()?;
        let response = self
            .http_client
            .get(url)
            .query(&[("modules", "assetProfile")])
            .send()
            .await
            .ok()?;
        let summary: QuoteSummaryResponse = response.json().await.ok()?;
        summary
            .quote_summary
            .result?
            .into_iter()
            .next()?
            .asset_profile?
            .sector
    }
}

#[async_trait]
impl MarketData for YahooMarketData {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        let result = self
            .chart(symbol, "1d")
            .await
            .and_then(|chart| latest_price(symbol, &chart));
        if let Err(e) = &result {
            warn!("Error fetching price for {}: {}", symbol, e);
        }
        result
    }

    async fn fetch_metadata(&self, symbol: &str) -> StockInfo {
        match self.chart(symbol, "1d").await {
            Ok(chart) => {
                let sector = self.sector(symbol).await;
                stock_info(symbol, &chart, sector)
            }
            Err(e) => {
                warn!("Error fetching metadata for {}: {}", symbol, e);
                StockInfo::fallback(symbol)
            }
        }
    }

    async fn fetch_history(&self, symbol: &str, period: &str) -> Vec<PricePoint> {
        match self.chart(symbol, period).await {
            Ok(chart) => closing_series(&chart),
            Err(e) => {
                warn!("Error fetching {} history for {}: {}", period, symbol, e);
                Vec::new()
            }
        }
    }
}
