use super::ui;
use crate::client::RatesClient;
use crate::core::rate::RateProvider;
use anyhow::{Context, Result, bail};
use tokio::time::timeout;

/// Fetches and displays the latest rates for every currency against `base`.
pub async fn run<P: RateProvider + 'static>(client: &RatesClient<P>, base: &str) -> Result<()> {
    let base = base.to_uppercase();

    let mut latest = client.subscribe_latest_rates();
    client.request_latest_rates(&base);

    let pb = ui::new_spinner(&format!("Fetching latest rates for {base}..."));
    let received = matches!(
        timeout(super::RESPONSE_TIMEOUT, latest.changed()).await,
        Ok(Ok(()))
    );
    pb.finish_and_clear();

    if !received {
        bail!("No response from the exchange rate service for base {base}");
    }
    let rates = latest
        .borrow()
        .clone()
        .context("No rates were published")?;

    println!(
        "\n{}",
        ui::style_text(&format!("Latest rates for {base}"), ui::StyleType::Title)
    );

    if rates.is_empty() {
        println!("{}", ui::style_text("No rates in response.", ui::StyleType::Subtle));
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Rate")]);
    for (currency, rate) in &rates {
        table.add_row(vec![
            comfy_table::Cell::new(currency),
            ui::rate_cell(*rate),
        ]);
    }
    println!("{table}");

    Ok(())
}
