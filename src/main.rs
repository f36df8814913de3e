use anyhow::Context;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use equity_research::config::AppConfig;
use equity_research::routes;
use equity_research::services::research::EquityResearch;
use equity_research::services::universe::TickerUniverse;
use equity_research::services::yahoo::YahooClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!("Using PORT: {}", config.port);

    let universe = TickerUniverse::load(&config.universe_path)
        .with_context(|| format!("loading {}", config.universe_path))?;
    let provider = YahooClient::new(&config.fetch).context("building HTTP client")?;
    let research = Arc::new(EquityResearch::new(
        Arc::new(provider),
        Arc::new(universe),
        config.research.clone(),
    ));

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    let api = routes::routes(research).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
