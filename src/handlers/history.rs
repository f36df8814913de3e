// src/handlers/history.rs
use log::info;
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::reject;
use crate::services::research::EquityResearch;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub begin: String,
    pub end: String,
}

pub async fn get_history(
    ticker: String,
    query: HistoryQuery,
    research: Arc<EquityResearch>,
) -> Result<Json, Rejection> {
    info!("Handling price history request for {} ({} to {})", ticker, query.begin, query.end);
    let points = research
        .price_history(&ticker, &query.begin, &query.end)
        .await
        .map_err(|e| reject("price history", e))?;
    Ok(warp::reply::json(&points))
}
