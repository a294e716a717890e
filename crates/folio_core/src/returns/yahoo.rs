//! Monthly closes from the public Yahoo Finance chart endpoint

use std::collections::BTreeMap;
use std::time::Duration;

use jiff::Timestamp;
use jiff::tz::TimeZone;
use serde::Deserialize;

use super::{HistoricalReturnProvider, MonthlyReturn, ReturnSeries};
use crate::config::EngineConfig;
use crate::error::RetrievalError;
use crate::model::{AssetClass, LookbackWindow};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Live provider fetching one representative ticker per class.
///
/// Requests are blocking and bounded by the configured timeout.
pub struct YahooChartProvider {
    client: reqwest::blocking::Client,
    tickers: BTreeMap<AssetClass, String>,
}

impl YahooChartProvider {
    pub fn new(
        tickers: BTreeMap<AssetClass, String>,
        timeout: Duration,
    ) -> Result<Self, RetrievalError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RetrievalError::Transport {
                ticker: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client, tickers })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, RetrievalError> {
        Self::new(
            config.tickers.clone(),
            Duration::from_secs(config.fetch_timeout_secs),
        )
    }

    fn fetch(&self, ticker: &str, window: LookbackWindow) -> Result<ChartResponse, RetrievalError> {
        let url = format!("{CHART_URL}/{ticker}");
        let response = self
            .client
            .get(url)
            .query(&[("range", window.token()), ("interval", "1mo")])
            .send()
            .map_err(|e| RetrievalError::Transport {
                ticker: ticker.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RetrievalError::Status {
                ticker: ticker.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.json().map_err(|e| RetrievalError::Parse {
            ticker: ticker.to_string(),
            message: e.to_string(),
        })
    }
}

impl HistoricalReturnProvider for YahooChartProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn monthly_returns(
        &self,
        class: AssetClass,
        window: LookbackWindow,
    ) -> Result<ReturnSeries, RetrievalError> {
        let ticker = self
            .tickers
            .get(&class)
            .ok_or(RetrievalError::NoInstrument(class))?;

        let response = self.fetch(ticker, window)?;
        let series = returns_from_chart(class, ticker, response)?;
        tracing::debug!(%class, ticker, periods = series.len(), "fetched monthly returns");
        Ok(series)
    }
}

/// Period-over-period change of the non-null monthly closes
fn returns_from_chart(
    class: AssetClass,
    ticker: &str,
    response: ChartResponse,
) -> Result<ReturnSeries, RetrievalError> {
    if let Some(error) = response.chart.error {
        return Err(RetrievalError::Parse {
            ticker: ticker.to_string(),
            message: error
                .description
                .unwrap_or_else(|| "chart error".to_string()),
        });
    }

    let result = response
        .chart
        .result
        .and_then(|mut results| results.pop())
        .ok_or_else(|| RetrievalError::Empty(ticker.to_string()))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut observations = Vec::with_capacity(closes.len());
    for (&ts, close) in result.timestamp.iter().zip(closes) {
        let Some(close) = close.filter(|c| c.is_finite() && *c > 0.0) else {
            continue;
        };
        let month = Timestamp::from_second(ts)
            .map_err(|e| RetrievalError::Parse {
                ticker: ticker.to_string(),
                message: e.to_string(),
            })?
            .to_zoned(TimeZone::UTC)
            .date()
            .first_of_month();
        observations.push((month, close));
    }

    let points: Vec<MonthlyReturn> = observations
        .windows(2)
        .map(|pair| MonthlyReturn {
            month: pair[1].0,
            value: pair[1].1 / pair[0].1 - 1.0,
        })
        .collect();

    let series = ReturnSeries::new(class, points);
    if series.is_empty() {
        return Err(RetrievalError::Empty(ticker.to_string()));
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_null_closes_are_dropped() {
        // 2024-01-01, 2024-02-01, 2024-03-01, 2024-04-01 UTC
        let body = r#"{"chart":{"result":[{"timestamp":[1704067200,1706745600,1709251200,1711929600],
            "indicators":{"quote":[{"close":[100.0,null,110.0,99.0]}]}}],"error":null}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let series = returns_from_chart(AssetClass::DomesticEquity, "BOVA11.SA", response).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].month, date(2024, 3, 1));
        assert!((series.points()[0].value - 0.10).abs() < 1e-12);
        assert!((series.points()[1].value - (-0.10)).abs() < 1e-12);
    }

    #[test]
    fn test_chart_error_is_reported() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let err = returns_from_chart(AssetClass::Crypto, "BTC-USD", response).unwrap_err();
        assert!(matches!(err, RetrievalError::Parse { .. }));
    }
}
