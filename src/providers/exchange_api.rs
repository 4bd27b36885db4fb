use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

use crate::core::rate::{HistoricalSeries, RateProvider, RateQuote, RateTable};

/// Provider for exchangeratesapi-style REST services.
///
/// Latest rates come back as `{ "rates": { "EGP": 30.5, ... } }`;
/// historical ranges as `{ "rates": { "2021-01-04": { "EGP": 30.5 }, ... } }`.
pub struct ExchangeApiProvider {
    base_url: String,
}

impl ExchangeApiProvider {
    pub fn new(base_url: &str) -> Self {
        ExchangeApiProvider {
            base_url: base_url.to_string(),
        }
    }

    async fn fetch_rates_body(&self, url: &str, context: &str) -> Result<String> {
        let client = reqwest::Client::builder().user_agent("fxc/1.0").build()?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for {} URL: {}", e, context, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for {}", response.status(), context));
        }

        Ok(response.text().await?)
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct HistoricalRatesResponse {
    rates: BTreeMap<NaiveDate, HashMap<String, f64>>,
}

#[async_trait]
impl RateProvider for ExchangeApiProvider {
    #[instrument(name = "LatestRatesFetch", skip(self), fields(base = %base))]
    async fn latest_rates(&self, base: &str) -> Result<RateTable> {
        let url = format!("{}/latest?base={}", self.base_url, base);
        debug!("Requesting latest rates from {}", url);

        let text = self.fetch_rates_body(&url, &format!("base currency: {base}")).await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for base {}: {}", base, e))?;

        Ok(data.rates.into_iter().collect())
    }

    #[instrument(name = "ExchangeRateFetch", skip(self), fields(base = %base, target = %target))]
    async fn exchange_rate(&self, base: &str, target: &str) -> Result<RateQuote> {
        let url = format!("{}/latest?base={}&symbols={}", self.base_url, base, target);
        debug!("Requesting exchange rate from {}", url);

        let pair = format!("{base}/{target}");
        let text = self
            .fetch_rates_body(&url, &format!("currency pair: {pair}"))
            .await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", pair, e))?;

        let rate = data
            .rates
            .get(target)
            .copied()
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {}", pair))?;

        Ok(RateQuote {
            base: base.to_string(),
            target: target.to_string(),
            rate,
        })
    }

    #[instrument(name = "HistoricalRatesFetch", skip(self), fields(base = %base, target = %target))]
    async fn historical_rates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        base: &str,
        target: &str,
    ) -> Result<HistoricalSeries> {
        let url = format!(
            "{}/history?start_at={}&end_at={}&base={}&symbols={}",
            self.base_url, start, end, base, target
        );
        debug!("Requesting historical rates from {}", url);

        let pair = format!("{base}/{target}");
        let text = self
            .fetch_rates_body(&url, &format!("currency pair: {pair}"))
            .await?;
        let data: HistoricalRatesResponse = serde_json::from_str(&text).map_err(|e| {
            anyhow!("Failed to parse historical JSON response for {}: {}", pair, e)
        })?;

        Ok(HistoricalSeries {
            base: base.to_string(),
            target: target.to_string(),
            rates: data.rates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn mount_latest(
        mock_server: &MockServer,
        base: &str,
        template: ResponseTemplate,
    ) {
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", base))
            .respond_with(template)
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn test_successful_latest_rates_fetch() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{
            "base": "USD",
            "date": "2021-01-08",
            "rates": { "EGP": 30.5, "EUR": 0.91, "GBP": 0.79 }
        }"#;
        mount_latest(
            &mock_server,
            "USD",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let provider = ExchangeApiProvider::new(&mock_server.uri());
        let rates = provider.latest_rates("USD").await.unwrap();

        assert_eq!(rates.len(), 3);
        assert_eq!(rates[0], ("EGP".to_string(), 30.5));
        assert_eq!(rates[2], ("GBP".to_string(), 0.79));
    }

    #[tokio::test]
    async fn test_successful_exchange_rate_fetch() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{ "rates": { "EGP": 30.5 } }"#;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "USD"))
            .and(query_param("symbols", "EGP"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        let provider = ExchangeApiProvider::new(&mock_server.uri());
        let quote = provider.exchange_rate("USD", "EGP").await.unwrap();

        assert_eq!(quote.base, "USD");
        assert_eq!(quote.target, "EGP");
        assert_eq!(quote.rate, 30.5);
    }

    #[tokio::test]
    async fn test_missing_pair_in_response() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{ "rates": { "EUR": 0.91 } }"#;
        mount_latest(
            &mock_server,
            "USD",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let provider = ExchangeApiProvider::new(&mock_server.uri());
        let result = provider.exchange_rate("USD", "EGP").await;

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No rate data found for currency pair: USD/EGP"
        );
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = MockServer::start().await;
        mount_latest(&mock_server, "USD", ResponseTemplate::new(500)).await;

        let provider = ExchangeApiProvider::new(&mock_server.uri());
        let result = provider.exchange_rate("USD", "EGP").await;

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for currency pair: USD/EGP"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = MockServer::start().await;
        // "rate" instead of "rates"
        let mock_response = r#"{ "rate": { "EGP": 30.5 } }"#;
        mount_latest(
            &mock_server,
            "USD",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let provider = ExchangeApiProvider::new(&mock_server.uri());
        let result = provider.exchange_rate("USD", "EGP").await;

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for USD/EGP")
        );
    }

    #[tokio::test]
    async fn test_successful_historical_rates_fetch() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{
            "base": "USD",
            "rates": {
                "2021-01-06": { "EGP": 30.7 },
                "2021-01-04": { "EGP": 30.5 },
                "2021-01-05": { "EGP": 30.6 }
            }
        }"#;

        Mock::given(method("GET"))
            .and(path("/history"))
            .and(query_param("start_at", "2021-01-01"))
            .and(query_param("end_at", "2021-01-08"))
            .and(query_param("base", "USD"))
            .and(query_param("symbols", "EGP"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        let provider = ExchangeApiProvider::new(&mock_server.uri());
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, 8).unwrap();
        let series = provider
            .historical_rates(start, end, "USD", "EGP")
            .await
            .unwrap();

        assert_eq!(series.base, "USD");
        assert_eq!(series.target, "EGP");
        assert_eq!(series.rates.len(), 3);

        // BTreeMap keys come out date-sorted regardless of response order
        let first = series.rates.keys().next().unwrap();
        assert_eq!(*first, NaiveDate::from_ymd_opt(2021, 1, 4).unwrap());
        assert_eq!(series.rates[first]["EGP"], 30.5);
    }
}
