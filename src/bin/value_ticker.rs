// src/bin/value_ticker.rs
use anyhow::{bail, Context};
use dotenv::dotenv;
use log::{error, info};
use std::env;
use std::sync::Arc;

use equity_research::config::AppConfig;
use equity_research::services::research::EquityResearch;
use equity_research::services::universe::TickerUniverse;
use equity_research::services::yahoo::YahooClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let Some(ticker) = env::args().nth(1) else {
        bail!("usage: value_ticker <TICKER>");
    };

    let config = AppConfig::from_env()?;
    let universe = TickerUniverse::load(&config.universe_path)
        .with_context(|| format!("loading {}", config.universe_path))?;
    let research = EquityResearch::new(
        Arc::new(YahooClient::new(&config.fetch)?),
        Arc::new(universe),
        config.research.clone(),
    );

    info!("Valuing {}...", ticker);
    match research.value(&ticker).await {
        Ok(report) => {
            info!(
                "SUCCESS: {} estimated at {:.2} (market {:.2})",
                report.profile.ticker, report.valuation.equity_value_per_share, report.market_price
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Err(e) => {
            error!("ERROR: valuation of {} failed: {}", ticker, e);
            return Err(e.into());
        }
    }

    Ok(())
}
