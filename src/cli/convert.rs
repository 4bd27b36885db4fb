use super::ui;
use crate::client::RatesClient;
use crate::core::dates::lookback_range;
use crate::core::rate::RateProvider;
use crate::screen::{
    ConversionOutput, ConversionState, Event, RATE_PLACEHOLDER, Request, Side, format_amount,
};
use anyhow::{Result, bail};
use comfy_table::Cell;
use tokio::time::timeout;

/// Converts `amount` from `base` to `target`, rendering the rate, the
/// converted value and the five-point history chart.
///
/// Drives the same pipeline an interactive screen would: the reducer
/// emits requests for the selected pair, the client publishes results
/// on its channels, and published values are fed back into the reducer.
pub async fn run<P: RateProvider + 'static>(
    client: &RatesClient<P>,
    amount: &str,
    base: &str,
    target: &str,
    lookback_days: i64,
) -> Result<()> {
    let base = base.to_uppercase();
    let target = target.to_uppercase();

    if base == target {
        println!(
            "{}",
            ui::style_text("Please pick a currency to convert.", ui::StyleType::Error)
        );
        println!("1 {base} = {RATE_PLACEHOLDER} {target}");
        return Ok(());
    }

    let (state, requests) = ConversionState::new(&base, &target)
        .apply(Event::CurrencyPicked(Side::Target, target.clone()));
    let (mut state, _) = state.apply(Event::AmountChanged(amount.to_string()));

    let mut quotes = client.subscribe_quotes();
    let mut history = client.subscribe_history();
    dispatch(client, lookback_days, requests);

    let pb = ui::new_spinner(&format!("Fetching rates for {base}/{target}..."));
    let (quote_result, series_result) = futures::join!(
        timeout(super::RESPONSE_TIMEOUT, quotes.changed()),
        timeout(super::RESPONSE_TIMEOUT, history.changed()),
    );
    let quote_received = matches!(quote_result, Ok(Ok(())));
    let series_received = matches!(series_result, Ok(Ok(())));
    pb.finish_and_clear();

    if !quote_received {
        bail!("No response from the exchange rate service for {base}/{target}");
    }

    let quote = quotes.borrow().clone();
    if let Some(quote) = quote {
        state = state.apply(Event::QuoteReceived(quote)).0;
    }
    if series_received {
        let series = history.borrow().clone();
        if let Some(series) = series {
            state = state.apply(Event::SeriesReceived(series)).0;
        }
    }

    println!(
        "\n{}",
        ui::style_text(&format!("{base} to {target}"), ui::StyleType::Title)
    );
    println!(
        "1 {base} = {} {target}",
        ui::style_text(&state.rate_display(), ui::StyleType::RateValue)
    );

    match state.output() {
        ConversionOutput::Converted(value) => {
            let mut table = ui::new_styled_table();
            table.set_header(vec![ui::header_cell(&base), ui::header_cell(&target)]);
            table.add_row(vec![
                Cell::new(&state.amount),
                Cell::new(format_amount(value)),
            ]);
            println!("{table}");
        }
        ConversionOutput::InvalidAmount => {
            println!(
                "{}",
                ui::style_text(
                    &format!("'{}' is not a number, type a value", state.amount),
                    ui::StyleType::Error
                )
            );
        }
        ConversionOutput::Empty => {}
        ConversionOutput::AwaitingRate | ConversionOutput::SameCurrency => {
            println!(
                "{}",
                ui::style_text("No conversion available.", ui::StyleType::Subtle)
            );
        }
    }

    match &state.chart {
        Some(chart) => super::history::render_chart(chart, &base, &target),
        None => println!(
            "{}",
            ui::style_text("No historical data available.", ui::StyleType::Subtle)
        ),
    }

    Ok(())
}

fn dispatch<P: RateProvider + 'static>(
    client: &RatesClient<P>,
    lookback_days: i64,
    requests: Vec<Request>,
) {
    for request in requests {
        match request {
            Request::ExchangeRate { base, target } => {
                client.request_exchange_rate(&base, &target);
            }
            Request::HistoricalRates { base, target } => {
                let (start, end) = lookback_range(lookback_days);
                client.request_historical_rates(start, end, &base, &target);
            }
        }
    }
}
