// src/services/recommendation.rs
use log::{info, warn};

use crate::error::Result;
use crate::models::{Candidate, PeerExclusion, Recommendation, ValuationResult};

/// A peer's own fair value next to its market price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerQuote {
    pub fair_value: f64,
    pub market_price: f64,
}

/// Lists peers trading below their fair value when the subject is not.
///
/// Candidates keep peer order unless `rank_by_margin` is set, in which case
/// they are sorted by `fair_value - market_price`, largest first.
pub fn recommend<F>(
    subject: &str,
    estimate: &ValuationResult,
    market_price: f64,
    peers: &[String],
    mut valuation_fn: F,
    rank_by_margin: bool,
) -> Recommendation
where
    F: FnMut(&str) -> Result<PeerQuote>,
{
    if estimate.equity_value_per_share >= market_price {
        info!(
            "{} estimate {:.2} is at or above market price {:.2}; no alternatives needed",
            subject, estimate.equity_value_per_share, market_price
        );
        return Recommendation {
            subject: subject.to_string(),
            fairly_valued: true,
            candidates: Vec::new(),
            exclusions: Vec::new(),
        };
    }

    let mut candidates = Vec::new();
    let mut exclusions = Vec::new();
    for peer in peers.iter().filter(|p| p.as_str() != subject) {
        match valuation_fn(peer) {
            Ok(quote) if quote.fair_value > quote.market_price => candidates.push(Candidate {
                ticker: peer.clone(),
                fair_value: quote.fair_value,
                market_price: quote.market_price,
            }),
            Ok(_) => {}
            Err(e) => {
                warn!("Skipping {} in recommendation scan for {}: {}", peer, subject, e);
                exclusions.push(PeerExclusion {
                    ticker: peer.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if rank_by_margin {
        candidates.sort_by(|a, b| b.margin().total_cmp(&a.margin()));
    }
    info!(
        "Better choice in the same industry as {}: {:?}",
        subject,
        candidates.iter().map(|c| c.ticker.as_str()).collect::<Vec<_>>()
    );

    Recommendation {
        subject: subject.to_string(),
        fairly_valued: false,
        candidates,
        exclusions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResearchError;
    use crate::models::CashFlowProjection;
    use std::collections::HashMap;

    fn estimate(value: f64) -> ValuationResult {
        ValuationResult {
            ticker: "SUBJ".to_string(),
            enterprise_value: 0.0,
            equity_value_per_share: value,
            projection: CashFlowProjection {
                periods: Vec::new(),
                terminal_year: 2030,
                terminal_value: 0.0,
            },
        }
    }

    fn peers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn quotes() -> HashMap<&'static str, PeerQuote> {
        HashMap::from([
            ("AAA", PeerQuote { fair_value: 50.0, market_price: 60.0 }),
            ("BBB", PeerQuote { fair_value: 80.0, market_price: 70.0 }),
            ("CCC", PeerQuote { fair_value: 10.0, market_price: 40.0 }),
            ("DDD", PeerQuote { fair_value: 90.0, market_price: 20.0 }),
        ])
    }

    fn lookup(ticker: &str) -> Result<PeerQuote> {
        quotes()
            .get(ticker)
            .copied()
            .ok_or_else(|| ResearchError::data_fetch(ticker, "not found"))
    }

    #[test]
    fn fairly_valued_subject_skips_scan() {
        let mut calls = 0;
        let rec = recommend(
            "SUBJ",
            &estimate(100.0),
            100.0,
            &peers(&["AAA", "BBB"]),
            |t| {
                calls += 1;
                lookup(t)
            },
            false,
        );
        assert!(rec.fairly_valued);
        assert!(rec.candidates.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn only_qualifying_peer_is_returned() {
        let rec = recommend("SUBJ", &estimate(40.0), 50.0, &peers(&["AAA", "BBB", "CCC"]), lookup, false);
        assert!(!rec.fairly_valued);
        let tickers: Vec<&str> = rec.candidates.iter().map(|c| c.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["BBB"]);
    }

    #[test]
    fn failing_peer_does_not_abort_scan() {
        let rec = recommend("SUBJ", &estimate(40.0), 50.0, &peers(&["XXX", "BBB", "DDD"]), lookup, false);
        assert_eq!(rec.candidates.len(), 2);
        assert_eq!(rec.exclusions.len(), 1);
        assert_eq!(rec.exclusions[0].ticker, "XXX");
    }

    #[test]
    fn insertion_order_unless_ranked() {
        let list = peers(&["BBB", "DDD"]);
        let rec = recommend("SUBJ", &estimate(1.0), 2.0, &list, lookup, false);
        assert_eq!(rec.candidates[0].ticker, "BBB");

        let rec = recommend("SUBJ", &estimate(1.0), 2.0, &list, lookup, true);
        assert_eq!(rec.candidates[0].ticker, "DDD");
    }

    #[test]
    fn subject_is_not_its_own_alternative() {
        let rec = recommend(
            "SUBJ",
            &estimate(1.0),
            2.0,
            &peers(&["SUBJ", "BBB"]),
            |t| {
                assert_ne!(t, "SUBJ");
                lookup(t)
            },
            false,
        );
        assert_eq!(rec.candidates.len(), 1);
    }
}
