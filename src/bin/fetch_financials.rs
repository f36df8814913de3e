// src/bin/fetch_financials.rs
use anyhow::bail;
use dotenv::dotenv;
use log::{error, info};
use std::env;

use equity_research::config::AppConfig;
use equity_research::services::provider::{fetch_snapshot, FinancialDataProvider};
use equity_research::services::yahoo::YahooClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let Some(ticker) = env::args().nth(1) else {
        bail!("usage: fetch_financials <TICKER>");
    };

    let config = AppConfig::from_env()?;
    let client = YahooClient::new(&config.fetch)?;

    info!("Testing Yahoo Finance statement fetching for {}...", ticker);
    match fetch_snapshot(&client, &ticker).await {
        Ok(snapshot) => {
            info!("SUCCESS: {} last price {}", ticker, snapshot.market_price);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Err(e) => {
            error!("ERROR: Failed to fetch {}: {}", ticker, e);
            return Err(e.into());
        }
    }

    let price = client.fetch_latest_price(&config.fetch.beta_benchmark).await?;
    info!("Benchmark {} at {}", config.fetch.beta_benchmark, price);

    Ok(())
}
