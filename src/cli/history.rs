use super::ui;
use crate::chart::ChartData;
use crate::client::RatesClient;
use crate::core::dates::lookback_range;
use crate::core::rate::RateProvider;
use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color};
use tokio::time::timeout;

/// Fetches a historical series for the pair and renders the five-point
/// rate chart.
pub async fn run<P: RateProvider + 'static>(
    client: &RatesClient<P>,
    base: &str,
    target: &str,
    days: i64,
) -> Result<()> {
    let base = base.to_uppercase();
    let target = target.to_uppercase();

    let mut history = client.subscribe_history();
    let (start, end) = lookback_range(days);
    client.request_historical_rates(start, end, &base, &target);

    let pb = ui::new_spinner(&format!("Fetching rate history for {base}/{target}..."));
    let received = matches!(
        timeout(super::RESPONSE_TIMEOUT, history.changed()).await,
        Ok(Ok(()))
    );
    pb.finish_and_clear();

    if !received {
        bail!("No response from the exchange rate service for {base}/{target}");
    }
    let series = history
        .borrow()
        .clone()
        .context("No historical series was published")?;

    let chart = ChartData::from_series(&series)?;
    render_chart(&chart, &base, &target);

    Ok(())
}

/// Renders chart points as a table with a scaled trend bar per date.
pub fn render_chart(chart: &ChartData, base: &str, target: &str) {
    println!(
        "\n{}",
        ui::style_text(&format!("{base}/{target} rate history"), ui::StyleType::Title)
    );

    let rates: Vec<f64> = chart.points.iter().map(|(_, rate)| *rate).collect();
    let min = rates.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = rates.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Rate"),
        ui::header_cell("Change"),
        ui::header_cell("Trend"),
    ]);

    let mut prev_rate: Option<f64> = None;
    for (label, (_, rate)) in chart.labels.iter().zip(&chart.points) {
        let change = match prev_rate {
            Some(prev) if prev != 0.0 => ui::change_cell(((rate - prev) / prev) * 100.0),
            _ => Cell::new("N/A").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(label),
            ui::rate_cell(*rate),
            change,
            Cell::new(trend_bar(*rate, min, max)),
        ]);
        prev_rate = Some(*rate);
    }
    println!("{table}");
}

fn trend_bar(rate: f64, min: f64, max: f64) -> String {
    const WIDTH: usize = 20;
    let filled = if (max - min).abs() < f64::EPSILON {
        WIDTH
    } else {
        1 + ((rate - min) / (max - min) * (WIDTH - 1) as f64).round() as usize
    };
    "▇".repeat(filled)
}
