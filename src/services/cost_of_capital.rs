// src/services/cost_of_capital.rs
use log::debug;

use crate::config::MarketAssumptions;
use crate::error::{ResearchError, Result, Step};
use crate::models::{CapitalCostResult, CompanyFinancials};

/// Single-factor cost of equity: `rf + beta * (rm - rf)`.
pub fn cost_of_equity(beta: f64, risk_free_rate: f64, market_return: f64) -> f64 {
    risk_free_rate + beta * (market_return - risk_free_rate)
}

pub fn cost_of_debt(ticker: &str, interest_expense: f64, total_debt: f64) -> Result<f64> {
    if !total_debt.is_finite() || total_debt <= 0.0 {
        return Err(ResearchError::DivisionUndefined {
            ticker: ticker.to_string(),
            step: Step::CostOfCapital,
            detail: format!("cost of debt needs positive total debt, got {}", total_debt),
        });
    }
    Ok(interest_expense / total_debt)
}

/// Blended discount rate with market-value equity and book-value debt weights.
pub fn cost_of_capital(
    company: &CompanyFinancials,
    market_price: f64,
    market: &MarketAssumptions,
) -> Result<CapitalCostResult> {
    let ticker = company.ticker.as_str();
    let cost_of_equity = cost_of_equity(company.beta, market.risk_free_rate, market.market_return);
    let cost_of_debt = cost_of_debt(ticker, company.interest_expense, company.total_debt())?;

    let market_cap = company.shares_outstanding as f64 * market_price;
    let book_debt = company.book_debt();
    let ev = market_cap + book_debt;
    if !ev.is_finite() || ev <= 0.0 {
        return Err(ResearchError::DivisionUndefined {
            ticker: ticker.to_string(),
            step: Step::CostOfCapital,
            detail: format!(
                "capital weights need positive market cap plus book debt, got {}",
                ev
            ),
        });
    }

    let equity_weight = market_cap / ev;
    let debt_weight = book_debt / ev;
    let weighted_cost_of_capital = equity_weight * cost_of_equity + debt_weight * cost_of_debt;
    debug!(
        "{}: ke={:.4} kd={:.4} wE={:.4} wD={:.4} wacc={:.4}",
        ticker, cost_of_equity, cost_of_debt, equity_weight, debt_weight, weighted_cost_of_capital
    );

    Ok(CapitalCostResult {
        cost_of_equity,
        cost_of_debt,
        market_cap,
        book_debt,
        equity_weight,
        debt_weight,
        weighted_cost_of_capital,
    })
}
