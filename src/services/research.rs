// src/services/research.rs
use futures::stream::{self, StreamExt};
use log::{info, warn};
use std::sync::Arc;

use crate::config::ResearchConfig;
use crate::error::{ResearchError, Result};
use crate::models::{
    BaselineReport, CompanyDetail, CompanyProfile, CompanySnapshot, IndustryBaseline,
    IndustryClass, PeerExclusion, PricePoint, ResearchReport, TickerRecord,
};
use crate::services::cost_of_capital::cost_of_capital;
use crate::services::growth::growth_rate;
use crate::services::history;
use crate::services::peers::industry_baseline;
use crate::services::provider::{fetch_snapshot, FinancialDataProvider};
use crate::services::recommendation::{recommend, PeerQuote};
use crate::services::universe::TickerUniverse;
use crate::services::valuation::{value_per_share, ValuationParams};

/// Peer fetch outcomes, in peer order.
struct FetchedPeers {
    results: Vec<(String, Result<CompanySnapshot>)>,
}

impl FetchedPeers {
    fn snapshots(&self) -> Vec<CompanySnapshot> {
        self.results
            .iter()
            .filter_map(|(_, r)| r.as_ref().ok().cloned())
            .collect()
    }

    fn exclusions(&self) -> Vec<PeerExclusion> {
        self.results
            .iter()
            .filter_map(|(ticker, r)| {
                r.as_ref().err().map(|e| PeerExclusion {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    fn get(&self, ticker: &str) -> Option<&Result<CompanySnapshot>> {
        self.results.iter().find(|(t, _)| t == ticker).map(|(_, r)| r)
    }
}

/// Runs research requests against a provider and the ticker universe.
#[derive(Clone)]
pub struct EquityResearch {
    provider: Arc<dyn FinancialDataProvider>,
    universe: Arc<TickerUniverse>,
    config: ResearchConfig,
}

fn profile(record: &TickerRecord) -> CompanyProfile {
    CompanyProfile {
        ticker: record.ticker.clone(),
        company: record.company.clone(),
        industry: record.industry.clone(),
        founded: record.founded.clone(),
    }
}

impl EquityResearch {
    pub fn new(
        provider: Arc<dyn FinancialDataProvider>,
        universe: Arc<TickerUniverse>,
        config: ResearchConfig,
    ) -> Self {
        Self {
            provider,
            universe,
            config,
        }
    }

    pub fn universe(&self) -> &TickerUniverse {
        &self.universe
    }

    pub fn company(&self, ticker: &str) -> Result<CompanyProfile> {
        self.universe.lookup(ticker).map(profile)
    }

    /// The industry `ticker` belongs to with all of its members.
    pub fn industry_members(&self, ticker: &str) -> Result<IndustryClass> {
        let label = self.universe.industry_of(ticker)?;
        Ok(IndustryClass {
            label: label.to_string(),
            tickers: self.universe.peers(label),
        })
    }

    pub async fn detail(&self, ticker: &str) -> Result<CompanyDetail> {
        let record = self.universe.lookup(ticker)?;
        let market_price = self.provider.fetch_latest_price(&record.ticker).await?;
        Ok(CompanyDetail {
            ticker: record.ticker.clone(),
            industry: record.industry.clone(),
            market_price,
        })
    }

    pub async fn price_history(&self, ticker: &str, begin: &str, end: &str) -> Result<Vec<PricePoint>> {
        let record = self.universe.lookup(ticker)?;
        history::price_history(self.provider.as_ref(), &record.ticker, begin, end).await
    }

    /// Valuation parameters for one company against its industry baseline.
    pub fn params(
        &self,
        short_term_rate: f64,
        short_term_growth: f64,
        baseline: &IndustryBaseline,
    ) -> ValuationParams {
        ValuationParams {
            short_term_rate,
            short_term_growth,
            long_term_rate: baseline.long_term_cost_of_capital,
            long_term_growth: baseline.long_term_growth_rate,
            start_year: self.config.start_year,
            high_growth_years: self.config.high_growth_years,
            tax_rate: self.config.tax_rate,
        }
    }

    async fn fetch_peers(&self, tickers: &[String]) -> FetchedPeers {
        let provider = Arc::clone(&self.provider);
        let results = stream::iter(tickers.to_vec())
            .map(move |ticker| {
                let provider = Arc::clone(&provider);
                async move {
                    let result = fetch_snapshot(provider.as_ref(), &ticker).await;
                    if let Err(e) = &result {
                        warn!("Could not fetch peer {}: {}", ticker, e);
                    }
                    (ticker, result)
                }
            })
            .buffered(self.config.peer_fetch_concurrency.max(1))
            .collect()
            .await;
        FetchedPeers { results }
    }

    fn baseline_from(
        &self,
        industry: &str,
        subject: Option<&CompanySnapshot>,
        peers: &FetchedPeers,
    ) -> Result<BaselineReport> {
        let mut members = Vec::new();
        if let Some(subject) = subject.filter(|_| self.config.include_subject_in_baseline) {
            members.push(subject.clone());
        }
        members.extend(peers.snapshots());

        let mut report = industry_baseline(
            industry,
            &members,
            &self.config.market,
            self.config.growth_floor,
        )?;
        let mut exclusions = peers.exclusions();
        exclusions.append(&mut report.exclusions);
        report.exclusions = exclusions;
        Ok(report)
    }

    /// Long-run baseline for the industry `ticker` belongs to, built from the
    /// same members `value` would use for that ticker.
    pub async fn baseline(&self, ticker: &str) -> Result<BaselineReport> {
        let record = self.universe.lookup(ticker)?;
        let members: Vec<String> = self
            .universe
            .peers(&record.industry)
            .into_iter()
            .filter(|t| self.config.include_subject_in_baseline || *t != record.ticker)
            .collect();
        let fetched = self.fetch_peers(&members).await;
        self.baseline_from(&record.industry, None, &fetched)
    }

    fn value_peer(&self, snapshot: &CompanySnapshot, baseline: &IndustryBaseline) -> Result<PeerQuote> {
        let capital = cost_of_capital(&snapshot.financials, snapshot.market_price, &self.config.market)?;
        let growth = growth_rate(&snapshot.financials, self.config.growth_floor)?;
        let params = self.params(capital.weighted_cost_of_capital, growth.rate, baseline);
        let valuation = value_per_share(&snapshot.financials, &params)?;
        Ok(PeerQuote {
            fair_value: valuation.equity_value_per_share,
            market_price: snapshot.market_price,
        })
    }

    /// Full research run: short-term numbers, industry baseline, two-stage
    /// value and, if the stock looks expensive, cheaper peers.
    pub async fn value(&self, ticker: &str) -> Result<ResearchReport> {
        let record = self.universe.lookup(ticker)?;
        let subject_ticker = record.ticker.clone();
        info!("Running valuation for {} ({})", subject_ticker, record.industry);

        let subject = fetch_snapshot(self.provider.as_ref(), &subject_ticker).await?;
        let peer_tickers: Vec<String> = self
            .universe
            .peers(&record.industry)
            .into_iter()
            .filter(|t| *t != subject_ticker)
            .collect();
        let fetched = self.fetch_peers(&peer_tickers).await;

        let capital_cost =
            cost_of_capital(&subject.financials, subject.market_price, &self.config.market)?;
        let growth = growth_rate(&subject.financials, self.config.growth_floor)?;
        let baseline = self.baseline_from(&record.industry, Some(&subject), &fetched)?;

        let params = self.params(
            capital_cost.weighted_cost_of_capital,
            growth.rate,
            &baseline.baseline,
        );
        let valuation = value_per_share(&subject.financials, &params)?;
        info!(
            "{}: estimated {:.2} per share vs market {:.2}",
            subject_ticker, valuation.equity_value_per_share, subject.market_price
        );

        let recommendation = recommend(
            &subject_ticker,
            &valuation,
            subject.market_price,
            &peer_tickers,
            |peer| match fetched.get(peer) {
                Some(Ok(snapshot)) => self.value_peer(snapshot, &baseline.baseline),
                Some(Err(e)) => Err(e.clone()),
                None => Err(ResearchError::data_fetch(peer, "peer was not fetched")),
            },
            self.config.rank_recommendations,
        );

        Ok(ResearchReport {
            profile: profile(record),
            market_price: subject.market_price,
            capital_cost,
            growth,
            baseline,
            valuation,
            recommendation,
        })
    }
}
