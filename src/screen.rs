//! Conversion view-state: pure event handlers over an immutable state record.
//!
//! The screen holds one `ConversionState` at a time and replaces it
//! wholesale on every event. Handlers return the follow-up requests to
//! issue instead of touching the network themselves, which keeps the
//! whole module synchronous and testable.

use tracing::{debug, warn};

use crate::chart::ChartData;
use crate::core::rate::{HistoricalSeries, RateQuote};

/// Shown instead of a rate when the pair is degenerate or no quote has
/// arrived yet.
pub const RATE_PLACEHOLDER: &str = "???";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Base,
    Target,
}

#[derive(Debug, Clone)]
pub enum Event {
    AmountChanged(String),
    CurrencyPicked(Side, String),
    QuoteReceived(RateQuote),
    SeriesReceived(HistoricalSeries),
}

/// Network requests a handler asks the caller to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ExchangeRate { base: String, target: String },
    HistoricalRates { base: String, target: String },
}

/// Outcome of deriving the converted amount from the current state.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutput {
    /// Blank amount: the output field stays empty.
    Empty,
    /// base == target: placeholder plus a pick-a-currency warning.
    SameCurrency,
    /// No quote has arrived for the current pair yet.
    AwaitingRate,
    /// The entered amount is not a number.
    InvalidAmount,
    Converted(f64),
}

#[derive(Debug, Clone)]
pub struct ConversionState {
    pub base: String,
    pub target: String,
    pub rate: Option<f64>,
    pub amount: String,
    pub chart: Option<ChartData>,
}

impl ConversionState {
    pub fn new(base: &str, target: &str) -> Self {
        ConversionState {
            base: base.to_string(),
            target: target.to_string(),
            rate: None,
            amount: String::new(),
            chart: None,
        }
    }

    /// Applies one event, returning the next state and the requests to
    /// issue. Quote and series events for a pair other than the current
    /// selection are discarded.
    pub fn apply(&self, event: Event) -> (Self, Vec<Request>) {
        match event {
            Event::AmountChanged(amount) => {
                let next = ConversionState {
                    amount,
                    ..self.clone()
                };
                (next, Vec::new())
            }
            Event::CurrencyPicked(side, code) => {
                let (base, target) = match side {
                    Side::Base => (code, self.target.clone()),
                    Side::Target => (self.base.clone(), code),
                };
                // The old quote and chart belong to the old pair.
                let next = ConversionState {
                    base: base.clone(),
                    target: target.clone(),
                    rate: None,
                    chart: None,
                    amount: self.amount.clone(),
                };
                let requests = vec![
                    Request::ExchangeRate {
                        base: base.clone(),
                        target: target.clone(),
                    },
                    Request::HistoricalRates { base, target },
                ];
                (next, requests)
            }
            Event::QuoteReceived(quote) => {
                if quote.base != self.base || quote.target != self.target {
                    debug!(
                        "Ignoring quote for {}/{}, selection is {}/{}",
                        quote.base, quote.target, self.base, self.target
                    );
                    return (self.clone(), Vec::new());
                }
                let next = ConversionState {
                    rate: Some(quote.rate),
                    ..self.clone()
                };
                (next, Vec::new())
            }
            Event::SeriesReceived(series) => {
                if series.base != self.base || series.target != self.target {
                    debug!(
                        "Ignoring series for {}/{}, selection is {}/{}",
                        series.base, series.target, self.base, self.target
                    );
                    return (self.clone(), Vec::new());
                }
                let chart = match ChartData::from_series(&series) {
                    Ok(chart) => Some(chart),
                    Err(e) => {
                        warn!("Dropping unusable historical series: {e}");
                        None
                    }
                };
                let next = ConversionState {
                    chart,
                    ..self.clone()
                };
                (next, Vec::new())
            }
        }
    }

    /// The rate as displayed next to the target currency.
    pub fn rate_display(&self) -> String {
        if self.base == self.target {
            return RATE_PLACEHOLDER.to_string();
        }
        match self.rate {
            Some(rate) => format!("{rate:.4}"),
            None => RATE_PLACEHOLDER.to_string(),
        }
    }

    /// Derives the converted amount from the entered amount and the
    /// last published rate.
    pub fn output(&self) -> ConversionOutput {
        if self.amount.trim().is_empty() {
            return ConversionOutput::Empty;
        }
        if self.base == self.target {
            return ConversionOutput::SameCurrency;
        }
        let amount: f64 = match self.amount.trim().parse() {
            Ok(amount) => amount,
            Err(_) => return ConversionOutput::InvalidAmount,
        };
        match self.rate {
            Some(rate) => ConversionOutput::Converted(amount * rate),
            None => ConversionOutput::AwaitingRate,
        }
    }
}

/// Formats a converted value: whole results keep one decimal place
/// (10 × 30.5 reads "305.0"), fractional results print naturally.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::{BTreeMap, HashMap};

    fn quote(base: &str, target: &str, rate: f64) -> RateQuote {
        RateQuote {
            base: base.to_string(),
            target: target.to_string(),
            rate,
        }
    }

    fn series(base: &str, target: &str, days: u32) -> HistoricalSeries {
        let mut rates = BTreeMap::new();
        for day in 1..=days {
            let date = NaiveDate::from_ymd_opt(2021, 1, day).unwrap();
            rates.insert(date, HashMap::from([(target.to_string(), 30.0 + day as f64)]));
        }
        HistoricalSeries {
            base: base.to_string(),
            target: target.to_string(),
            rates,
        }
    }

    #[test]
    fn test_conversion_is_amount_times_rate() {
        let state = ConversionState::new("USD", "EGP");
        let (state, _) = state.apply(Event::QuoteReceived(quote("USD", "EGP", 30.5)));
        let (state, _) = state.apply(Event::AmountChanged("10".to_string()));

        assert_eq!(state.output(), ConversionOutput::Converted(305.0));
        assert_eq!(format_amount(305.0), "305.0");
        assert_eq!(state.rate_display(), "30.5000");
    }

    #[test]
    fn test_blank_amount_yields_no_output() {
        let state = ConversionState::new("USD", "EGP");
        let (state, _) = state.apply(Event::QuoteReceived(quote("USD", "EGP", 30.5)));
        let (state, _) = state.apply(Event::AmountChanged("  ".to_string()));

        assert_eq!(state.output(), ConversionOutput::Empty);
    }

    #[test]
    fn test_non_numeric_amount() {
        let state = ConversionState::new("USD", "EGP");
        let (state, _) = state.apply(Event::QuoteReceived(quote("USD", "EGP", 30.5)));
        let (state, _) = state.apply(Event::AmountChanged("ten".to_string()));

        assert_eq!(state.output(), ConversionOutput::InvalidAmount);
    }

    #[test]
    fn test_same_currency_shows_placeholder_and_skips_conversion() {
        let state = ConversionState::new("USD", "USD");
        // Even a published quote must not produce a conversion.
        let (state, _) = state.apply(Event::QuoteReceived(quote("USD", "USD", 1.0)));
        let (state, _) = state.apply(Event::AmountChanged("10".to_string()));

        assert_eq!(state.rate_display(), RATE_PLACEHOLDER);
        assert_eq!(state.output(), ConversionOutput::SameCurrency);
    }

    #[test]
    fn test_currency_pick_invalidates_rate_and_requests_both() {
        let state = ConversionState::new("USD", "EGP");
        let (state, _) = state.apply(Event::QuoteReceived(quote("USD", "EGP", 30.5)));

        let (state, requests) =
            state.apply(Event::CurrencyPicked(Side::Target, "EUR".to_string()));

        assert_eq!(state.target, "EUR");
        assert_eq!(state.rate, None);
        assert_eq!(state.chart, None);
        assert_eq!(
            requests,
            vec![
                Request::ExchangeRate {
                    base: "USD".to_string(),
                    target: "EUR".to_string()
                },
                Request::HistoricalRates {
                    base: "USD".to_string(),
                    target: "EUR".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_base_pick_keeps_target() {
        let state = ConversionState::new("USD", "EGP");
        let (state, requests) =
            state.apply(Event::CurrencyPicked(Side::Base, "GBP".to_string()));

        assert_eq!(state.base, "GBP");
        assert_eq!(state.target, "EGP");
        assert_eq!(requests.len(), 2);
    }

    #[test]
    fn test_quote_for_old_pair_is_discarded() {
        let state = ConversionState::new("USD", "EGP");
        let (state, _) = state.apply(Event::CurrencyPicked(Side::Target, "EUR".to_string()));

        // A late response for the previous selection arrives.
        let (state, _) = state.apply(Event::QuoteReceived(quote("USD", "EGP", 30.5)));
        assert_eq!(state.rate, None);

        let (state, _) = state.apply(Event::QuoteReceived(quote("USD", "EUR", 0.91)));
        assert_eq!(state.rate, Some(0.91));
    }

    #[test]
    fn test_newer_quote_overwrites_displayed_rate() {
        let state = ConversionState::new("USD", "EGP");
        let (state, _) = state.apply(Event::QuoteReceived(quote("USD", "EGP", 30.5)));
        let (state, _) = state.apply(Event::QuoteReceived(quote("USD", "EGP", 31.0)));

        assert_eq!(state.rate_display(), "31.0000");
    }

    #[test]
    fn test_series_builds_chart_for_current_pair_only() {
        let state = ConversionState::new("USD", "EGP");

        let (state, _) = state.apply(Event::SeriesReceived(series("USD", "EUR", 7)));
        assert!(state.chart.is_none());

        let (state, _) = state.apply(Event::SeriesReceived(series("USD", "EGP", 7)));
        let chart = state.chart.expect("chart should be built");
        assert_eq!(chart.points.len(), 5);
    }

    #[test]
    fn test_short_series_leaves_chart_empty() {
        let state = ConversionState::new("USD", "EGP");
        let (state, _) = state.apply(Event::SeriesReceived(series("USD", "EGP", 2)));
        assert!(state.chart.is_none());
    }

    #[test]
    fn test_awaiting_rate_before_any_quote() {
        let state = ConversionState::new("USD", "EGP");
        let (state, _) = state.apply(Event::AmountChanged("10".to_string()));

        assert_eq!(state.rate_display(), RATE_PLACEHOLDER);
        assert_eq!(state.output(), ConversionOutput::AwaitingRate);
    }

    #[test]
    fn test_format_amount_fractional() {
        assert_eq!(format_amount(30.75), "30.75");
        assert_eq!(format_amount(305.0), "305.0");
    }
}
