// src/routes.rs
use log::info;
use std::convert::Infallible;
use std::sync::Arc;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::company::{
    get_company, get_detail, get_peers, list_industries, list_tickers, search, SearchQuery,
};
use crate::handlers::error::ApiError;
use crate::handlers::history::{get_history, HistoryQuery};
use crate::handlers::valuation::{get_baseline, get_valuation};
use crate::services::research::EquityResearch;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let kind;
    let message: String;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        kind = "not_found";
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        kind = api_error.kind;
        message = api_error.message.clone();
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        kind = "invalid_query";
        message = e.to_string();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        kind = "internal";
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
            "kind": kind,
        })),
        code,
    ))
}

pub fn routes(
    research: Arc<EquityResearch>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let research_filter = warp::any().map(move || research.clone());

    let tickers_route = warp::path!("api" / "v1" / "tickers")
        .and(warp::get())
        .and(research_filter.clone())
        .and_then(list_tickers);

    let search_route = warp::path!("api" / "v1" / "search")
        .and(warp::get())
        .and(warp::query::<SearchQuery>())
        .and(research_filter.clone())
        .and_then(search);

    let industries_route = warp::path!("api" / "v1" / "industries")
        .and(warp::get())
        .and(research_filter.clone())
        .and_then(list_industries);

    let peers_route = warp::path!("api" / "v1" / "peers" / String)
        .and(warp::get())
        .and(research_filter.clone())
        .and_then(get_peers);

    let company_route = warp::path!("api" / "v1" / "company" / String)
        .and(warp::get())
        .and(research_filter.clone())
        .and_then(get_company);

    let detail_route = warp::path!("api" / "v1" / "detail" / String)
        .and(warp::get())
        .and(research_filter.clone())
        .and_then(get_detail);

    let baseline_route = warp::path!("api" / "v1" / "baseline" / String)
        .and(warp::get())
        .and(research_filter.clone())
        .and_then(get_baseline);

    let valuation_route = warp::path!("api" / "v1" / "valuation" / String)
        .and(warp::get())
        .and(research_filter.clone())
        .and_then(get_valuation);

    let history_route = warp::path!("api" / "v1" / "history" / String)
        .and(warp::get())
        .and(warp::query::<HistoryQuery>())
        .and(research_filter.clone())
        .and_then(get_history);

    info!("All routes configured successfully.");

    tickers_route
        .or(search_route)
        .or(industries_route)
        .or(peers_route)
        .or(company_route)
        .or(detail_route)
        .or(baseline_route)
        .or(valuation_route)
        .or(history_route)
        .recover(handle_rejection)
}
