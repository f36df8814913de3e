mod common;

use common::*;
use equity_research::config::ResearchConfig;
use equity_research::error::{ResearchError, Step};
use equity_research::services::cost_of_capital::cost_of_capital;
use equity_research::services::growth::growth_rate;
use equity_research::services::valuation::{value_per_share, ValuationParams};
use std::sync::Arc;

#[tokio::test]
async fn expensive_subject_gets_the_one_cheap_peer() {
    let research = research(widgets_provider());
    let report = research.value("subj").await.unwrap();

    assert_eq!(report.profile.ticker, "SUBJ");
    assert_eq!(report.profile.industry, "Widgets");
    assert_eq!(report.market_price, 1_000.0);
    assert!(report.valuation.equity_value_per_share > 0.0);
    assert!(report.valuation.equity_value_per_share < report.market_price);

    let recommendation = &report.recommendation;
    assert!(!recommendation.fairly_valued);
    let tickers: Vec<&str> = recommendation.candidates.iter().map(|c| c.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["QQQ"]);
    assert!(recommendation.candidates[0].fair_value > recommendation.candidates[0].market_price);
    assert!(recommendation.exclusions.is_empty());
}

#[tokio::test]
async fn report_matches_the_engine_run_by_hand() {
    let research = research(widgets_provider());
    let report = research.value("SUBJ").await.unwrap();
    let config = ResearchConfig::default();

    // subject plus three peers
    assert_eq!(report.baseline.baseline.peer_count, 4);
    let mean_wacc = report
        .baseline
        .peers
        .iter()
        .map(|p| p.weighted_cost_of_capital)
        .sum::<f64>()
        / 4.0;
    assert!((report.baseline.baseline.long_term_cost_of_capital - mean_wacc).abs() < 1e-12);

    let subject = widget_maker("SUBJ");
    let capital = cost_of_capital(&subject, 1_000.0, &config.market).unwrap();
    let growth = growth_rate(&subject, config.growth_floor).unwrap();
    assert_eq!(report.capital_cost, capital);
    assert_eq!(report.growth, growth);

    let params = ValuationParams {
        short_term_rate: capital.weighted_cost_of_capital,
        short_term_growth: growth.rate,
        long_term_rate: report.baseline.baseline.long_term_cost_of_capital,
        long_term_growth: report.baseline.baseline.long_term_growth_rate,
        start_year: 2020,
        high_growth_years: 10,
        tax_rate: 0.21,
    };
    let expected = value_per_share(&subject, &params).unwrap();
    assert_eq!(report.valuation, expected);
    assert_eq!(report.valuation.projection.terminal_year, 2030);
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let research = research(widgets_provider());
    let first = research.value("SUBJ").await.unwrap();
    let second = research.value("SUBJ").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn cheap_subject_needs_no_alternatives() {
    let provider = widgets_provider().with(widget_maker("SUBJ"), 0.5);
    let report = research(provider).value("SUBJ").await.unwrap();
    assert!(report.recommendation.fairly_valued);
    assert!(report.recommendation.candidates.is_empty());
}

#[tokio::test]
async fn broken_peers_are_excluded_not_fatal() {
    let mut no_debt = widget_maker("RRR");
    no_debt.long_term_debt = 0.0;
    no_debt.accounts_payable = 0.0;
    let provider = widgets_provider().with(no_debt, 1_000.0).without("SSS");

    let report = research(provider).value("SUBJ").await.unwrap();
    assert_eq!(report.baseline.baseline.peer_count, 2);

    let excluded: Vec<&str> = report.baseline.exclusions.iter().map(|x| x.ticker.as_str()).collect();
    assert_eq!(excluded, vec!["SSS", "RRR"]);

    let scan_excluded: Vec<&str> = report
        .recommendation
        .exclusions
        .iter()
        .map(|x| x.ticker.as_str())
        .collect();
    assert_eq!(scan_excluded, vec!["RRR", "SSS"]);
    assert_eq!(report.recommendation.candidates.len(), 1);
}

#[tokio::test]
async fn subject_failure_is_terminal_and_names_the_company() {
    let mut no_debt = widget_maker("SUBJ");
    no_debt.long_term_debt = 0.0;
    no_debt.accounts_payable = 0.0;
    let provider = widgets_provider().with(no_debt, 1_000.0);

    let err = research(provider).value("SUBJ").await.unwrap_err();
    match err {
        ResearchError::DivisionUndefined { ticker, step, .. } => {
            assert_eq!(ticker, "SUBJ");
            assert_eq!(step, Step::CostOfCapital);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn subject_excluded_from_baseline_when_configured() {
    let config = ResearchConfig {
        include_subject_in_baseline: false,
        ..ResearchConfig::default()
    };
    let report = research_with(widgets_provider(), config).value("SUBJ").await.unwrap();
    assert_eq!(report.baseline.baseline.peer_count, 3);
    assert!(report.baseline.peers.iter().all(|p| p.ticker != "SUBJ"));
}

#[tokio::test]
async fn baseline_route_agrees_with_valuation_when_subject_is_left_out() {
    let config = ResearchConfig {
        include_subject_in_baseline: false,
        ..ResearchConfig::default()
    };
    let provider = Arc::new(widgets_provider());
    let research = research_sharing(Arc::clone(&provider), config);

    let standalone = research.baseline("SUBJ").await.unwrap();
    assert_eq!(provider.fetch_count(), 3);
    let report = research.value("SUBJ").await.unwrap();

    assert_eq!(standalone.baseline.peer_count, 3);
    let tickers: Vec<&str> = standalone.peers.iter().map(|p| p.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["QQQ", "RRR", "SSS"]);
    assert_eq!(standalone, report.baseline);
}

#[tokio::test]
async fn valuation_fetches_each_member_once() {
    let provider = Arc::new(widgets_provider());
    let research = research_sharing(Arc::clone(&provider), ResearchConfig::default());
    research.value("SUBJ").await.unwrap();
    assert_eq!(provider.fetch_count(), 4);

    research.baseline("SUBJ").await.unwrap();
    assert_eq!(provider.fetch_count(), 8);
}

#[tokio::test]
async fn industry_members_follow_the_table() {
    let research = research(widgets_provider());
    let class = research.industry_members("rrr").unwrap();
    assert_eq!(class.label, "Widgets");
    assert_eq!(class.tickers, vec!["SUBJ", "QQQ", "RRR", "SSS"]);
    assert_eq!(research.industry_members("NOPE").unwrap_err().kind(), "unknown_ticker");
}

#[tokio::test]
async fn lone_company_without_data_has_no_peers() {
    let research = research(widgets_provider());
    let err = research.baseline("SOLO").await.unwrap_err();
    assert_eq!(
        err,
        ResearchError::NoPeers {
            industry: "Gadgets".to_string()
        }
    );
}

#[tokio::test]
async fn industry_baseline_covers_all_members() {
    let report = research(widgets_provider()).baseline("QQQ").await.unwrap();
    assert_eq!(report.baseline.industry, "Widgets");
    let tickers: Vec<&str> = report.peers.iter().map(|p| p.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["SUBJ", "QQQ", "RRR", "SSS"]);
}

#[tokio::test]
async fn unknown_ticker_is_reported() {
    let err = research(widgets_provider()).value("NOPE").await.unwrap_err();
    assert_eq!(err.kind(), "unknown_ticker");
}

#[tokio::test]
async fn detail_returns_industry_and_price() {
    let detail = research(widgets_provider()).detail("QQQ").await.unwrap();
    assert_eq!(detail.industry, "Widgets");
    assert_eq!(detail.market_price, 0.5);
}

#[tokio::test]
async fn price_history_is_filtered_to_range() {
    let research = research(widgets_provider());
    let points = research
        .price_history("SUBJ", "2020-01-03", "2020-01-06")
        .await
        .unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, date(2020, 1, 3));
}

#[tokio::test]
async fn malformed_dates_are_rejected_before_fetching() {
    let research = research(widgets_provider());
    let err = research
        .price_history("SUBJ", "01/03/2020", "2020-01-06")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ResearchError::InvalidDateFormat {
            input: "01/03/2020".to_string()
        }
    );

    let err = research
        .price_history("SUBJ", "2020-02-01", "2020-01-06")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_parameter");
}
