//! Chart data extraction from a historical rate series.

use anyhow::{Result, anyhow, bail};

use crate::core::rate::HistoricalSeries;

/// The chart always renders exactly this many points.
pub const CHART_POINTS: usize = 5;

/// Five (index, rate) points plus their date labels, ready for a
/// line-chart renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub points: Vec<(usize, f64)>,
}

impl ChartData {
    /// Takes the first five chronologically-ordered entries of the
    /// series and the target currency's rate on each date. Entries
    /// beyond the fifth are ignored; fewer than five is an error.
    pub fn from_series(series: &HistoricalSeries) -> Result<Self> {
        if series.rates.len() < CHART_POINTS {
            bail!(
                "Historical series for {}/{} has {} entries, need {}",
                series.base,
                series.target,
                series.rates.len(),
                CHART_POINTS
            );
        }

        let mut labels = Vec::with_capacity(CHART_POINTS);
        let mut points = Vec::with_capacity(CHART_POINTS);
        for (i, (date, rates)) in series.rates.iter().take(CHART_POINTS).enumerate() {
            let rate = rates
                .get(&series.target)
                .copied()
                .ok_or_else(|| anyhow!("No rate for {} on {}", series.target, date))?;
            labels.push(date.to_string());
            points.push((i, rate));
        }

        Ok(ChartData { labels, points })
    }
}
