// src/services/peers.rs
use log::{info, warn};

use crate::config::MarketAssumptions;
use crate::error::{ResearchError, Result};
use crate::models::{BaselineReport, CompanySnapshot, IndustryBaseline, PeerExclusion, PeerMetrics};
use crate::services::cost_of_capital::cost_of_capital;
use crate::services::growth::growth_rate;

/// Short-term cost of capital and growth for one peer.
pub fn peer_metrics(
    snapshot: &CompanySnapshot,
    market: &MarketAssumptions,
    growth_floor: f64,
) -> Result<PeerMetrics> {
    let capital = cost_of_capital(&snapshot.financials, snapshot.market_price, market)?;
    let growth = growth_rate(&snapshot.financials, growth_floor)?;
    Ok(PeerMetrics {
        ticker: snapshot.ticker().to_string(),
        weighted_cost_of_capital: capital.weighted_cost_of_capital,
        growth_rate: growth.rate,
    })
}

fn calculate_average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Arithmetic mean of peer metrics; the industry's long-run assumptions.
pub fn average_metrics(industry: &str, peers: &[PeerMetrics]) -> Result<IndustryBaseline> {
    let no_peers = || ResearchError::NoPeers {
        industry: industry.to_string(),
    };
    let long_term_cost_of_capital =
        calculate_average(peers.iter().map(|p| p.weighted_cost_of_capital)).ok_or_else(no_peers)?;
    let long_term_growth_rate =
        calculate_average(peers.iter().map(|p| p.growth_rate)).ok_or_else(no_peers)?;

    Ok(IndustryBaseline {
        industry: industry.to_string(),
        long_term_cost_of_capital,
        long_term_growth_rate,
        peer_count: peers.len(),
    })
}

/// Evaluates every peer independently and averages the ones that succeed.
///
/// A failing peer is logged and recorded in `exclusions`; the call only fails
/// when no peer is left.
pub fn industry_baseline(
    industry: &str,
    snapshots: &[CompanySnapshot],
    market: &MarketAssumptions,
    growth_floor: f64,
) -> Result<BaselineReport> {
    let mut peers = Vec::with_capacity(snapshots.len());
    let mut exclusions = Vec::new();

    for snapshot in snapshots {
        match peer_metrics(snapshot, market, growth_floor) {
            Ok(metrics) => peers.push(metrics),
            Err(e) => {
                warn!("Excluding {} from {} baseline: {}", snapshot.ticker(), industry, e);
                exclusions.push(PeerExclusion {
                    ticker: snapshot.ticker().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let baseline = average_metrics(industry, &peers)?;
    info!(
        "{} baseline from {} peer(s): cost of capital {:.4}, growth {:.4}",
        industry, baseline.peer_count, baseline.long_term_cost_of_capital, baseline.long_term_growth_rate
    );

    Ok(BaselineReport {
        baseline,
        peers,
        exclusions,
    })
}
