// src/services/yahoo.rs
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::OnceCell;

use crate::config::FetchConfig;
use crate::error::{ResearchError, Result};
use crate::models::{chronological, CompanyFinancials, PricePoint};
use crate::services::provider::FinancialDataProvider;
use crate::services::retry::{retry_with_backoff, BackoffConfig};

const YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";
const CHART_PATH: &str = "/v8/finance/chart";
const TIMESERIES_PATH: &str = "/ws/fundamentals-timeseries/v1/finance/timeseries";
// 1985-08-23, older than any annual statement Yahoo serves
const TIMESERIES_START: i64 = 493_590_046;

const REVENUE: &str = "annualTotalRevenue";
const EBIT: &str = "annualEBIT";
const INTEREST_EXPENSE: &str = "annualInterestExpense";
const LONG_TERM_DEBT: &str = "annualLongTermDebt";
const ACCOUNTS_PAYABLE: &str = "annualAccountsPayable";
const CURRENT_LIABILITIES: &str = "annualCurrentLiabilities";
const CASH: &str = "annualCashAndCashEquivalents";
const OPERATING_CASH_FLOW: &str = "annualOperatingCashFlow";
const CAPITAL_EXPENDITURE: &str = "annualCapitalExpenditure";
const SHARES: &str = "annualOrdinarySharesNumber";

const STATEMENT_TYPES: &[&str] = &[
    REVENUE,
    EBIT,
    INTEREST_EXPENSE,
    LONG_TERM_DEBT,
    ACCOUNTS_PAYABLE,
    CURRENT_LIABILITIES,
    CASH,
    OPERATING_CASH_FLOW,
    CAPITAL_EXPENDITURE,
    SHARES,
];

type StatementRows = HashMap<String, Vec<(NaiveDate, f64)>>;

/// Yahoo Finance backed provider.
pub struct YahooClient {
    client: Client,
    base_url: String,
    backoff: BackoffConfig,
    beta_benchmark: String,
    // Benchmark monthly closes, shared by every beta estimate this client makes.
    benchmark_closes: OnceCell<Vec<PricePoint>>,
}

#[derive(Debug)]
struct RequestFailure {
    message: String,
    transient: bool,
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<reqwest::Error> for RequestFailure {
    fn from(e: reqwest::Error) -> Self {
        RequestFailure {
            transient: e.is_timeout() || e.is_connect() || e.is_request(),
            message: e.to_string(),
        }
    }
}

fn encode_symbol(symbol: &str) -> String {
    symbol.replace('^', "%5E")
}

impl YahooClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Self::with_base_url(config, YAHOO_BASE_URL)
    }

    pub fn with_base_url(config: &FetchConfig, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(config.timeout)
            .build()
            .map_err(|e| ResearchError::invalid_parameter("http client", e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            backoff: config.backoff,
            beta_benchmark: config.beta_benchmark.clone(),
            benchmark_closes: OnceCell::new(),
        })
    }

    async fn request_once(&self, url: &str) -> std::result::Result<Value, RequestFailure> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RequestFailure {
                message: format!("HTTP {} from {}", status, url),
                transient: status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
            });
        }
        resp.json::<Value>().await.map_err(|e| RequestFailure {
            message: format!("invalid JSON from {}: {}", url, e),
            transient: false,
        })
    }

    async fn get_json(&self, ticker: &str, url: &str) -> Result<Value> {
        info!("Fetching data from URL: {}", url);
        retry_with_backoff(&self.backoff, url, |e: &RequestFailure| e.transient, || {
            self.request_once(url)
        })
        .await
        .map_err(|e| ResearchError::data_fetch(ticker, e.message))
    }

    async fn chart(&self, ticker: &str, query: &str) -> Result<ChartData> {
        let url = format!(
            "{}{}/{}?{}",
            self.base_url,
            CHART_PATH,
            encode_symbol(ticker),
            query
        );
        let json = self.get_json(ticker, &url).await?;
        parse_chart(ticker, &json)
    }

    async fn monthly_closes(&self, ticker: &str) -> Result<Vec<PricePoint>> {
        Ok(self.chart(ticker, "range=5y&interval=1mo").await?.points)
    }

    /// Fetched on first use; a failed fetch is retried on the next call.
    async fn benchmark_closes(&self) -> Result<&[PricePoint]> {
        let closes = self
            .benchmark_closes
            .get_or_try_init(|| async {
                info!("Loading beta benchmark {}", self.beta_benchmark);
                self.monthly_closes(&self.beta_benchmark).await
            })
            .await?;
        Ok(closes.as_slice())
    }

    async fn statements(&self, ticker: &str) -> Result<StatementRows> {
        let url = format!(
            "{}{}/{}?symbol={}&type={}&period1={}&period2={}",
            self.base_url,
            TIMESERIES_PATH,
            encode_symbol(ticker),
            encode_symbol(ticker),
            STATEMENT_TYPES.join(","),
            TIMESERIES_START,
            Utc::now().timestamp()
        );
        let json = self.get_json(ticker, &url).await?;
        parse_timeseries(ticker, &json)
    }
}

#[async_trait]
impl FinancialDataProvider for YahooClient {
    async fn fetch(&self, ticker: &str) -> Result<CompanyFinancials> {
        let (rows, stock, market) = tokio::try_join!(
            self.statements(ticker),
            self.monthly_closes(ticker),
            self.benchmark_closes(),
        )?;
        let beta = estimate_beta(&stock, market).ok_or_else(|| {
            ResearchError::data_fetch(
                ticker,
                format!("not enough monthly history against {} to estimate beta", self.beta_benchmark),
            )
        })?;
        debug!("{}: estimated beta {:.3}", ticker, beta);
        financials_from_rows(ticker, &rows, beta)
    }

    async fn fetch_price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        let period1 = start.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
        // end is inclusive
        let period2 = (end + Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp());
        let (period1, period2) = match (period1, period2) {
            (Some(p1), Some(p2)) => (p1, p2),
            _ => return Err(ResearchError::invalid_parameter("date range", "out of range")),
        };
        let query = format!(
            "period1={}&period2={}&interval=1d&includeAdjustedClose=true",
            period1, period2
        );
        let chart = self.chart(ticker, &query).await?;
        Ok(chart
            .points
            .into_iter()
            .filter(|p| p.date >= start && p.date <= end)
            .collect())
    }

    async fn fetch_latest_price(&self, ticker: &str) -> Result<f64> {
        let chart = self.chart(ticker, "range=5d&interval=1d").await?;
        chart
            .regular_market_price
            .or_else(|| chart.points.last().map(|p| p.adj_close))
            .ok_or_else(|| ResearchError::data_fetch(ticker, "no price in chart response"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub points: Vec<PricePoint>,
    pub regular_market_price: Option<f64>,
}

/// Parses a v8 chart response, preferring adjusted closes over raw closes.
pub fn parse_chart(ticker: &str, json: &Value) -> Result<ChartData> {
    let chart = json.get("chart").ok_or_else(|| ResearchError::data_fetch(ticker, "no chart in response"))?;
    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let description = err
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or("unknown chart error");
        return Err(ResearchError::data_fetch(ticker, description));
    }
    let result = chart
        .get("result")
        .and_then(|r| r.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| ResearchError::data_fetch(ticker, "no chart data found"))?;

    let regular_market_price = result
        .get("meta")
        .and_then(|m| m.get("regularMarketPrice"))
        .and_then(|p| p.as_f64());

    let timestamps: Vec<i64> = result
        .get("timestamp")
        .and_then(|t| t.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_i64()).collect())
        .unwrap_or_default();

    let indicators = result.get("indicators");
    let closes = indicators
        .and_then(|i| i.get("adjclose"))
        .and_then(|a| a.get(0))
        .and_then(|a| a.get("adjclose"))
        .or_else(|| {
            indicators
                .and_then(|i| i.get("quote"))
                .and_then(|q| q.get(0))
                .and_then(|q| q.get("close"))
        })
        .and_then(|c| c.as_array());

    let points = match closes {
        Some(closes) => timestamps
            .iter()
            .zip(closes)
            .filter_map(|(&ts, close)| {
                let price = close.as_f64()?;
                let date = DateTime::from_timestamp(ts, 0)?.date_naive();
                Some(PricePoint {
                    date,
                    adj_close: price,
                })
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(ChartData {
        points,
        regular_market_price,
    })
}

/// Groups fundamentals-timeseries entries by statement type.
pub fn parse_timeseries(ticker: &str, json: &Value) -> Result<StatementRows> {
    let results = json
        .get("timeseries")
        .and_then(|t| t.get("result"))
        .and_then(|r| r.as_array())
        .ok_or_else(|| ResearchError::data_fetch(ticker, "no timeseries in response"))?;

    let mut rows: StatementRows = HashMap::new();
    for result in results {
        let Some(kind) = result
            .get("meta")
            .and_then(|m| m.get("type"))
            .and_then(|t| t.get(0))
            .and_then(|t| t.as_str())
        else {
            continue;
        };
        let Some(entries) = result.get(kind).and_then(|e| e.as_array()) else {
            continue;
        };
        let parsed: Vec<(NaiveDate, f64)> = entries
            .iter()
            .filter_map(|entry| {
                let date = entry.get("asOfDate")?.as_str()?;
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                let value = entry.get("reportedValue")?.get("raw")?.as_f64()?;
                Some((date, value))
            })
            .collect();
        if !parsed.is_empty() {
            rows.insert(kind.to_string(), parsed);
        }
    }
    Ok(rows)
}

fn latest(rows: &StatementRows, kind: &str) -> Option<f64> {
    rows.get(kind)?
        .iter()
        .max_by_key(|(date, _)| *date)
        .map(|(_, value)| *value)
}

/// Builds `CompanyFinancials` from statement rows.
///
/// Revenue, EBIT, operating cash flow, capex and share count are required.
/// Missing debt, payables, liabilities, cash or interest rows read as zero.
pub fn financials_from_rows(ticker: &str, rows: &StatementRows, beta: f64) -> Result<CompanyFinancials> {
    let missing = |kind: &str| ResearchError::data_fetch(ticker, format!("missing {} row", kind));
    let required = |kind: &str| latest(rows, kind).ok_or_else(|| missing(kind));
    let optional = |kind: &str| {
        latest(rows, kind).unwrap_or_else(|| {
            debug!("{}: no {} row, using 0", ticker, kind);
            0.0
        })
    };
    let series = |kind: &str| {
        rows.get(kind)
            .map(|r| chronological(r.clone()))
            .ok_or_else(|| missing(kind))
    };

    let shares = required(SHARES)?;
    if !shares.is_finite() || shares < 0.0 {
        return Err(ResearchError::data_fetch(ticker, format!("invalid share count {}", shares)));
    }

    Ok(CompanyFinancials {
        ticker: ticker.to_string(),
        beta,
        shares_outstanding: shares.round() as u64,
        interest_expense: optional(INTEREST_EXPENSE).abs(),
        long_term_debt: optional(LONG_TERM_DEBT),
        accounts_payable: optional(ACCOUNTS_PAYABLE),
        current_liabilities: optional(CURRENT_LIABILITIES),
        cash: optional(CASH),
        operating_cash_flow: required(OPERATING_CASH_FLOW)?,
        capital_expenditures: required(CAPITAL_EXPENDITURE)?,
        revenue: series(REVENUE)?,
        ebit: series(EBIT)?,
    })
}

fn period_returns(points: &[PricePoint]) -> HashMap<NaiveDate, f64> {
    points
        .windows(2)
        .filter(|w| w[0].adj_close != 0.0)
        .map(|w| (w[1].date, w[1].adj_close / w[0].adj_close - 1.0))
        .collect()
}

/// Slope of stock returns on market returns over matching dates.
pub fn estimate_beta(stock: &[PricePoint], market: &[PricePoint]) -> Option<f64> {
    let market_returns = period_returns(market);
    let mut stock_returns: Vec<(NaiveDate, f64)> = period_returns(stock).into_iter().collect();
    stock_returns.sort_by_key(|(date, _)| *date);
    let pairs: Vec<(f64, f64)> = stock_returns
        .into_iter()
        .filter_map(|(date, r)| market_returns.get(&date).map(|&m| (r, m)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_s = pairs.iter().map(|(s, _)| s).sum::<f64>() / n;
    let mean_m = pairs.iter().map(|(_, m)| m).sum::<f64>() / n;
    let cov = pairs.iter().map(|(s, m)| (s - mean_s) * (m - mean_m)).sum::<f64>();
    let var = pairs.iter().map(|(_, m)| (m - mean_m).powi(2)).sum::<f64>();
    if var == 0.0 {
        None
    } else {
        Some(cov / var)
    }
}
