// src/services/provider.rs
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{CompanyFinancials, CompanySnapshot, PricePoint};

/// Source of statements and prices, keyed by ticker symbol.
#[async_trait]
pub trait FinancialDataProvider: Send + Sync {
    async fn fetch(&self, ticker: &str) -> Result<CompanyFinancials>;

    /// Adjusted closes between `start` and `end`, oldest first.
    async fn fetch_price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>>;

    async fn fetch_latest_price(&self, ticker: &str) -> Result<f64>;
}

/// Financials and latest price for one ticker.
pub async fn fetch_snapshot<P>(provider: &P, ticker: &str) -> Result<CompanySnapshot>
where
    P: FinancialDataProvider + ?Sized,
{
    let financials = provider.fetch(ticker).await?;
    let market_price = provider.fetch_latest_price(ticker).await?;
    Ok(CompanySnapshot {
        financials,
        market_price,
    })
}
