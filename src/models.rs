// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Latest annual statement figures for one company.
///
/// `revenue` and `ebit` run oldest to newest. Interest expense is stored as a
/// positive cost; capital expenditures keep the reported (negative) sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFinancials {
    pub ticker: String,
    pub beta: f64,
    pub shares_outstanding: u64,
    pub interest_expense: f64,
    pub long_term_debt: f64,
    pub accounts_payable: f64,
    pub current_liabilities: f64,
    pub cash: f64,
    pub operating_cash_flow: f64,
    pub capital_expenditures: f64,
    pub revenue: Vec<f64>,
    pub ebit: Vec<f64>,
}

impl CompanyFinancials {
    /// Debt used as the denominator of the cost of debt.
    pub fn total_debt(&self) -> f64 {
        self.long_term_debt + self.accounts_payable
    }

    /// Book value of debt used for the capital-structure weights.
    pub fn book_debt(&self) -> f64 {
        self.current_liabilities + self.long_term_debt
    }
}

/// Orders dated rows oldest first and keeps the values.
pub fn chronological(mut rows: Vec<(NaiveDate, f64)>) -> Vec<f64> {
    rows.sort_by_key(|(date, _)| *date);
    rows.into_iter().map(|(_, value)| value).collect()
}

/// Financials paired with the market price fetched alongside them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySnapshot {
    pub financials: CompanyFinancials,
    pub market_price: f64,
}

impl CompanySnapshot {
    pub fn ticker(&self) -> &str {
        &self.financials.ticker
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    #[serde(rename(deserialize = "Ticker"))]
    pub ticker: String,
    #[serde(rename(deserialize = "Company"))]
    pub company: String,
    #[serde(rename(deserialize = "Industry"))]
    pub industry: String,
    #[serde(rename(deserialize = "Founded"), default)]
    pub founded: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryClass {
    pub label: String,
    pub tickers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapitalCostResult {
    pub cost_of_equity: f64,
    pub cost_of_debt: f64,
    pub market_cap: f64,
    pub book_debt: f64,
    pub equity_weight: f64,
    pub debt_weight: f64,
    pub weighted_cost_of_capital: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthEstimate {
    pub revenue_growth: f64,
    pub earnings_growth: f64,
    /// Adopted short-term growth rate.
    pub rate: f64,
    /// True when both candidates were negative and the floor was used.
    pub floored: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerMetrics {
    pub ticker: String,
    pub weighted_cost_of_capital: f64,
    pub growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerExclusion {
    pub ticker: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryBaseline {
    pub industry: String,
    pub long_term_cost_of_capital: f64,
    pub long_term_growth_rate: f64,
    pub peer_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineReport {
    pub baseline: IndustryBaseline,
    pub peers: Vec<PeerMetrics>,
    pub exclusions: Vec<PeerExclusion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionPeriod {
    pub year: i32,
    /// Years elapsed since the start year.
    pub period: u32,
    pub operating_cash_flow: f64,
    pub interest_expense: f64,
    pub tax_shield: f64,
    pub capital_expenditures: f64,
    pub net_cash_flow: f64,
    pub terminal_value: f64,
    pub free_cash_flow: f64,
    pub present_value: Option<f64>,
}

/// Seed year plus the explicit high-growth years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowProjection {
    pub periods: Vec<ProjectionPeriod>,
    pub terminal_year: i32,
    pub terminal_value: f64,
}

impl CashFlowProjection {
    /// Periods that contribute to enterprise value (the seed is left out).
    pub fn retained(&self) -> &[ProjectionPeriod] {
        self.periods.get(1..).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationResult {
    pub ticker: String,
    pub enterprise_value: f64,
    pub equity_value_per_share: f64,
    pub projection: CashFlowProjection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub ticker: String,
    pub fair_value: f64,
    pub market_price: f64,
}

impl Candidate {
    pub fn margin(&self) -> f64 {
        self.fair_value - self.market_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub subject: String,
    /// True when the estimate is at or above the market price.
    pub fairly_valued: bool,
    pub candidates: Vec<Candidate>,
    pub exclusions: Vec<PeerExclusion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adj_close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyProfile {
    pub ticker: String,
    pub company: String,
    pub industry: String,
    pub founded: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    pub ticker: String,
    pub industry: String,
    pub market_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchReport {
    pub profile: CompanyProfile,
    pub market_price: f64,
    pub capital_cost: CapitalCostResult,
    pub growth: GrowthEstimate,
    pub baseline: BaselineReport,
    pub valuation: ValuationResult,
    pub recommendation: Recommendation,
}
