// src/services/history.rs
use chrono::NaiveDate;
use log::info;

use crate::error::{ResearchError, Result};
use crate::models::PricePoint;
use crate::services::provider::FinancialDataProvider;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    // chrono accepts unpadded fields; the format requires exactly YYYY-MM-DD
    if trimmed.len() != 10 {
        return Err(ResearchError::InvalidDateFormat {
            input: input.to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| ResearchError::InvalidDateFormat {
        input: input.to_string(),
    })
}

/// Adjusted-close history for a user-supplied `YYYY-MM-DD` date range.
pub async fn price_history<P>(
    provider: &P,
    ticker: &str,
    begin: &str,
    end: &str,
) -> Result<Vec<PricePoint>>
where
    P: FinancialDataProvider + ?Sized,
{
    let start = parse_date(begin)?;
    let end = parse_date(end)?;
    if start > end {
        return Err(ResearchError::invalid_parameter(
            "begin",
            format!("{} is after end date {}", start, end),
        ));
    }
    info!("Fetching {} price history {} to {}", ticker, start, end);
    provider.fetch_price_history(ticker, start, end).await
}
