// src/services/growth.rs
use log::{debug, warn};

use crate::error::{ResearchError, Result};
use crate::models::{CompanyFinancials, GrowthEstimate};

/// Mean period-over-period change of a chronologically ordered series.
///
/// Pairs with a zero base have no defined change and are skipped.
pub fn mean_growth(ticker: &str, series_name: &'static str, series: &[f64]) -> Result<f64> {
    let changes: Vec<f64> = series
        .windows(2)
        .filter_map(|pair| {
            let (prev, next) = (pair[0], pair[1]);
            if prev == 0.0 || !prev.is_finite() || !next.is_finite() {
                warn!(
                    "{}: skipping {} change {} -> {} (undefined base)",
                    ticker, series_name, prev, next
                );
                None
            } else {
                Some(next / prev - 1.0)
            }
        })
        .collect();

    if changes.is_empty() {
        // no defined change means at most one point is usable
        return Err(ResearchError::InsufficientHistory {
            ticker: ticker.to_string(),
            series: series_name,
            periods: series.len().min(1),
        });
    }
    Ok(changes.iter().sum::<f64>() / changes.len() as f64)
}

/// Short-term growth: the larger of revenue and EBIT growth, or `floor` when
/// both are negative.
pub fn growth_rate(company: &CompanyFinancials, floor: f64) -> Result<GrowthEstimate> {
    let revenue_growth = mean_growth(&company.ticker, "revenue", &company.revenue)?;
    let earnings_growth = mean_growth(&company.ticker, "ebit", &company.ebit)?;

    let floored = revenue_growth < 0.0 && earnings_growth < 0.0;
    let rate = if floored {
        floor
    } else {
        revenue_growth.max(earnings_growth)
    };
    debug!(
        "{}: revenue growth {:.4}, earnings growth {:.4}, adopted {:.4}{}",
        company.ticker,
        revenue_growth,
        earnings_growth,
        rate,
        if floored { " (floor)" } else { "" }
    );

    Ok(GrowthEstimate {
        revenue_growth,
        earnings_growth,
        rate,
        floored,
    })
}
