// src/handlers/company.rs
use log::info;
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::reject;
use crate::services::research::EquityResearch;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

pub async fn list_tickers(research: Arc<EquityResearch>) -> Result<Json, Rejection> {
    info!("Handling request to list tickers");
    Ok(warp::reply::json(&research.universe().records()))
}

pub async fn search(query: SearchQuery, research: Arc<EquityResearch>) -> Result<Json, Rejection> {
    info!("Handling search for '{}'", query.q);
    let hits = research.universe().search(&query.q);
    Ok(warp::reply::json(&hits))
}

pub async fn list_industries(research: Arc<EquityResearch>) -> Result<Json, Rejection> {
    info!("Handling request to list industries");
    Ok(warp::reply::json(&research.universe().industries()))
}

pub async fn get_peers(ticker: String, research: Arc<EquityResearch>) -> Result<Json, Rejection> {
    info!("Handling request for the industry of {}", ticker);
    let class = research
        .industry_members(&ticker)
        .map_err(|e| reject("industry lookup", e))?;
    Ok(warp::reply::json(&class))
}

pub async fn get_company(ticker: String, research: Arc<EquityResearch>) -> Result<Json, Rejection> {
    info!("Handling request for company {}", ticker);
    let profile = research
        .company(&ticker)
        .map_err(|e| reject("company lookup", e))?;
    Ok(warp::reply::json(&profile))
}

pub async fn get_detail(ticker: String, research: Arc<EquityResearch>) -> Result<Json, Rejection> {
    info!("Handling request for detail on {}", ticker);
    let detail = research
        .detail(&ticker)
        .await
        .map_err(|e| reject("detail", e))?;
    Ok(warp::reply::json(&detail))
}
