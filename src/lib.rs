pub mod chart;
pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod providers;
pub mod screen;

use anyhow::Result;
use tracing::{debug, info};

use crate::client::RatesClient;
use crate::providers::exchange_api::ExchangeApiProvider;

#[derive(Debug, Clone)]
pub enum AppCommand {
    Convert {
        amount: String,
        from: Option<String>,
        to: Option<String>,
    },
    Rates {
        base: Option<String>,
    },
    History {
        from: Option<String>,
        to: Option<String>,
        days: Option<i64>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let base_url = config
        .providers
        .exchange
        .as_ref()
        .map_or(config::DEFAULT_API_URL, |p| &p.base_url);
    let client = RatesClient::new(ExchangeApiProvider::new(base_url));

    match command {
        AppCommand::Convert { amount, from, to } => {
            let base = from.unwrap_or_else(|| config.base_currency.clone());
            let target = to.unwrap_or_else(|| config.target_currency.clone());
            cli::convert::run(&client, &amount, &base, &target, config.lookback_days).await
        }
        AppCommand::Rates { base } => {
            let base = base.unwrap_or_else(|| config.base_currency.clone());
            cli::rates::run(&client, &base).await
        }
        AppCommand::History { from, to, days } => {
            let base = from.unwrap_or_else(|| config.base_currency.clone());
            let target = to.unwrap_or_else(|| config.target_currency.clone());
            let days = days.unwrap_or(config.lookback_days);
            cli::history::run(&client, &base, &target, days).await
        }
    }
}
