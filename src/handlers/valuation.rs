// src/handlers/valuation.rs
use log::info;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::reject;
use crate::services::research::EquityResearch;

pub async fn get_valuation(ticker: String, research: Arc<EquityResearch>) -> Result<Json, Rejection> {
    info!("Handling valuation request for {}", ticker);
    let report = research
        .value(&ticker)
        .await
        .map_err(|e| reject("valuation", e))?;
    info!(
        "{}: estimate {:.2}, market {:.2}, {} alternative(s)",
        report.profile.ticker,
        report.valuation.equity_value_per_share,
        report.market_price,
        report.recommendation.candidates.len()
    );
    Ok(warp::reply::json(&report))
}

pub async fn get_baseline(ticker: String, research: Arc<EquityResearch>) -> Result<Json, Rejection> {
    info!("Handling industry baseline request for {}", ticker);
    let report = research
        .baseline(&ticker)
        .await
        .map_err(|e| reject("industry baseline", e))?;
    Ok(warp::reply::json(&report))
}
