//! Exchange rate abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A single fetched exchange rate for a currency pair.
///
/// Immutable once received; a newer quote for the same pair supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub base: String,
    pub target: String,
    pub rate: f64,
}

/// Latest rates for a base currency, as ordered (currency, rate) pairs.
pub type RateTable = Vec<(String, f64)>;

/// A date-indexed collection of per-currency rates for a requested range.
///
/// The `BTreeMap` keeps entries sorted chronologically, which the chart
/// layer relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub base: String,
    pub target: String,
    pub rates: BTreeMap<NaiveDate, HashMap<String, f64>>,
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the latest rates for every currency against `base`.
    async fn latest_rates(&self, base: &str) -> Result<RateTable>;

    /// Fetches the latest rate for a single currency pair.
    async fn exchange_rate(&self, base: &str, target: &str) -> Result<RateQuote>;

    /// Fetches a dated rate series for a pair over `[start, end]`.
    async fn historical_rates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        base: &str,
        target: &str,
    ) -> Result<HistoricalSeries>;
}
