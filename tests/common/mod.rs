#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use equity_research::config::ResearchConfig;
use equity_research::error::{ResearchError, Result};
use equity_research::models::{CompanyFinancials, PricePoint};
use equity_research::services::provider::FinancialDataProvider;
use equity_research::services::research::EquityResearch;
use equity_research::services::universe::TickerUniverse;

pub const UNIVERSE: &str = "\
Ticker,Company,Industry,Founded
SUBJ,Subject Corp,Widgets,1990
QQQ,Bargain Widgets,Widgets,1985
RRR,Pricey Widgets,Widgets,1970
SSS,Premium Widgets,Widgets,2001
SOLO,Lonely Gadgets,Gadgets,2010
";

/// In-memory provider keyed by ticker.
#[derive(Default)]
pub struct MockProvider {
    companies: HashMap<String, (CompanyFinancials, f64)>,
    history: Vec<PricePoint>,
    pub fetches: AtomicUsize,
}

impl MockProvider {
    pub fn with(mut self, financials: CompanyFinancials, price: f64) -> Self {
        self.companies
            .insert(financials.ticker.clone(), (financials, price));
        self
    }

    pub fn without(mut self, ticker: &str) -> Self {
        self.companies.remove(ticker);
        self
    }

    pub fn with_history(mut self, history: Vec<PricePoint>) -> Self {
        self.history = history;
        self
    }

    fn entry(&self, ticker: &str) -> Result<&(CompanyFinancials, f64)> {
        self.companies
            .get(ticker)
            .ok_or_else(|| ResearchError::DataFetch {
                ticker: ticker.to_string(),
                reason: "No data found, symbol may be delisted".to_string(),
            })
    }
}

#[async_trait]
impl FinancialDataProvider for MockProvider {
    async fn fetch(&self, ticker: &str) -> Result<CompanyFinancials> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.entry(ticker).map(|(f, _)| f.clone())
    }

    async fn fetch_price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        self.entry(ticker)?;
        Ok(self
            .history
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect())
    }

    async fn fetch_latest_price(&self, ticker: &str) -> Result<f64> {
        self.entry(ticker).map(|(_, price)| *price)
    }
}

pub fn widget_maker(ticker: &str) -> CompanyFinancials {
    CompanyFinancials {
        ticker: ticker.to_string(),
        beta: 1.0,
        shares_outstanding: 1_000,
        interest_expense: 10.0,
        long_term_debt: 100.0,
        accounts_payable: 25.0,
        current_liabilities: 50.0,
        cash: 50.0,
        operating_cash_flow: 100.0,
        capital_expenditures: -20.0,
        revenue: vec![100.0, 105.0],
        ebit: vec![10.0, 10.4],
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Subject and two peers priced far above fair value, one peer far below.
pub fn widgets_provider() -> MockProvider {
    MockProvider::default()
        .with(widget_maker("SUBJ"), 1_000.0)
        .with(widget_maker("QQQ"), 0.5)
        .with(widget_maker("RRR"), 1_000.0)
        .with(widget_maker("SSS"), 900.0)
        .with_history(vec![
            PricePoint { date: date(2020, 1, 2), adj_close: 10.0 },
            PricePoint { date: date(2020, 1, 3), adj_close: 10.5 },
            PricePoint { date: date(2020, 1, 6), adj_close: 10.2 },
        ])
}

/// Engine over a provider the caller keeps a handle to.
pub fn research_sharing(provider: Arc<MockProvider>, config: ResearchConfig) -> EquityResearch {
    let universe = TickerUniverse::from_reader(UNIVERSE.as_bytes()).unwrap();
    EquityResearch::new(provider, Arc::new(universe), config)
}

pub fn research_with(provider: MockProvider, config: ResearchConfig) -> EquityResearch {
    research_sharing(Arc::new(provider), config)
}

impl MockProvider {
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

pub fn research(provider: MockProvider) -> EquityResearch {
    research_with(provider, ResearchConfig::default())
}
