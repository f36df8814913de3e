// src/services/valuation.rs
//! Two-stage DCF: an explicit high-growth horizon followed by a
//! perpetuity-growth terminal value.

use log::debug;
use serde::Serialize;

use crate::error::{ResearchError, Result, Step};
use crate::models::{CashFlowProjection, CompanyFinancials, ProjectionPeriod, ValuationResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValuationParams {
    pub short_term_rate: f64,
    pub short_term_growth: f64,
    pub long_term_rate: f64,
    pub long_term_growth: f64,
    pub start_year: i32,
    pub high_growth_years: u32,
    pub tax_rate: f64,
}

impl ValuationParams {
    pub const DEFAULT_HIGH_GROWTH_YEARS: u32 = 10;
    pub const DEFAULT_TAX_RATE: f64 = 0.21;

    fn validate(&self) -> Result<()> {
        if self.high_growth_years < 1 {
            return Err(ResearchError::invalid_parameter(
                "high_growth_years",
                "must be at least 1",
            ));
        }
        let rates = [
            ("short_term_rate", self.short_term_rate),
            ("short_term_growth", self.short_term_growth),
            ("long_term_rate", self.long_term_rate),
            ("long_term_growth", self.long_term_growth),
            ("tax_rate", self.tax_rate),
        ];
        for (name, value) in rates {
            if !value.is_finite() {
                return Err(ResearchError::invalid_parameter(
                    name,
                    format!("must be finite, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

/// The four line items that make up one year's net cash flow.
#[derive(Debug, Clone, Copy)]
struct LineItems {
    operating_cash_flow: f64,
    interest_expense: f64,
    tax_shield: f64,
    capital_expenditures: f64,
}

impl LineItems {
    fn seed(company: &CompanyFinancials, tax_rate: f64) -> Self {
        Self {
            operating_cash_flow: company.operating_cash_flow,
            interest_expense: company.interest_expense,
            tax_shield: -company.interest_expense * tax_rate,
            capital_expenditures: company.capital_expenditures,
        }
    }

    fn grown(&self, growth: f64) -> Self {
        let factor = 1.0 + growth;
        Self {
            operating_cash_flow: self.operating_cash_flow * factor,
            interest_expense: self.interest_expense * factor,
            tax_shield: self.tax_shield * factor,
            capital_expenditures: self.capital_expenditures * factor,
        }
    }

    fn net_cash_flow(&self) -> f64 {
        self.operating_cash_flow + self.interest_expense + self.tax_shield + self.capital_expenditures
    }

    fn into_period(self, start_year: i32, period: u32) -> ProjectionPeriod {
        let net_cash_flow = self.net_cash_flow();
        ProjectionPeriod {
            year: start_year + period as i32,
            period,
            operating_cash_flow: self.operating_cash_flow,
            interest_expense: self.interest_expense,
            tax_shield: self.tax_shield,
            capital_expenditures: self.capital_expenditures,
            net_cash_flow,
            terminal_value: 0.0,
            free_cash_flow: net_cash_flow,
            present_value: None,
        }
    }
}

/// Projects the seed year through `start_year + high_growth_years` and attaches
/// the terminal value to the last explicit year.
pub fn project_cash_flows(
    company: &CompanyFinancials,
    params: &ValuationParams,
) -> Result<CashFlowProjection> {
    params.validate()?;
    let spread = params.long_term_rate - params.long_term_growth;
    if spread <= 0.0 {
        return Err(ResearchError::TerminalValueUndefined {
            ticker: company.ticker.clone(),
            long_term_rate: params.long_term_rate,
            long_term_growth: params.long_term_growth,
        });
    }

    let horizon = params.high_growth_years;
    let mut items = LineItems::seed(company, params.tax_rate);
    let mut periods = Vec::with_capacity(horizon as usize + 1);
    periods.push(items.into_period(params.start_year, 0));
    for period in 1..=horizon {
        items = items.grown(params.short_term_growth);
        periods.push(items.into_period(params.start_year, period));
    }

    // One more year at the same rate supplies the perpetuity numerator; it is
    // not kept as a period.
    let next_cash_flow = items.grown(params.short_term_growth).net_cash_flow();
    let terminal_value = next_cash_flow / spread;

    for p in periods.iter_mut().skip(1) {
        if p.period == horizon {
            p.terminal_value = terminal_value;
        }
        p.free_cash_flow = p.net_cash_flow + p.terminal_value;
        p.present_value =
            Some(p.free_cash_flow / (1.0 + params.short_term_rate).powi(p.period as i32));
    }

    Ok(CashFlowProjection {
        periods,
        terminal_year: params.start_year + horizon as i32,
        terminal_value,
    })
}

/// Equity value per share from the discounted projection, net of long-term
/// debt and plus cash.
pub fn value_per_share(company: &CompanyFinancials, params: &ValuationParams) -> Result<ValuationResult> {
    if company.shares_outstanding == 0 {
        return Err(ResearchError::DivisionUndefined {
            ticker: company.ticker.clone(),
            step: Step::Valuation,
            detail: "shares outstanding is zero".to_string(),
        });
    }

    let projection = project_cash_flows(company, params)?;
    let enterprise_value: f64 = projection
        .retained()
        .iter()
        .filter_map(|p| p.present_value)
        .sum();
    let equity_value_per_share =
        (enterprise_value - company.long_term_debt + company.cash) / company.shares_outstanding as f64;
    debug!(
        "{}: EV {:.2}, terminal value {:.2} in {}, value per share {:.4}",
        company.ticker, enterprise_value, projection.terminal_value, projection.terminal_year, equity_value_per_share
    );

    Ok(ValuationResult {
        ticker: company.ticker.clone(),
        enterprise_value,
        equity_value_per_share,
        projection,
    })
}
