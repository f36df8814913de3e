// src/config.rs
use dotenv::dotenv;
use log::{info, warn};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ResearchError, Result};
use crate::services::retry::BackoffConfig;

/// Inputs to the single-factor cost of equity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketAssumptions {
    pub risk_free_rate: f64,
    pub market_return: f64,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.03,
            market_return: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResearchConfig {
    pub market: MarketAssumptions,
    pub tax_rate: f64,
    pub high_growth_years: u32,
    pub start_year: i32,
    pub growth_floor: f64,
    pub include_subject_in_baseline: bool,
    pub rank_recommendations: bool,
    pub peer_fetch_concurrency: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            market: MarketAssumptions::default(),
            tax_rate: 0.21,
            high_growth_years: 10,
            start_year: 2020,
            growth_floor: 0.03,
            include_subject_in_baseline: true,
            rank_recommendations: false,
            peer_fetch_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub backoff: BackoffConfig,
    pub beta_benchmark: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            backoff: BackoffConfig::default(),
            beta_benchmark: "^GSPC".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub universe_path: String,
    pub research: ResearchConfig,
    pub fetch: FetchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3030,
            universe_path: "data/sp500.csv".to_string(),
            research: ResearchConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        let read = Reader { lookup: &lookup };

        let backoff = BackoffConfig {
            min_backoff_ms: read.or("BACKOFF_MIN_MS", defaults.fetch.backoff.min_backoff_ms)?,
            max_backoff_ms: read.or("BACKOFF_MAX_MS", defaults.fetch.backoff.max_backoff_ms)?,
            max_retries: read.or("FETCH_MAX_RETRIES", defaults.fetch.backoff.max_retries)?,
            ..defaults.fetch.backoff
        };
        if backoff.min_backoff_ms > backoff.max_backoff_ms {
            return Err(ResearchError::invalid_parameter(
                "BACKOFF_MIN_MS",
                "must not exceed BACKOFF_MAX_MS",
            ));
        }

        let research = ResearchConfig {
            market: MarketAssumptions {
                risk_free_rate: read.or("RISK_FREE_RATE", defaults.research.market.risk_free_rate)?,
                market_return: read.or("MARKET_RETURN", defaults.research.market.market_return)?,
            },
            tax_rate: read.or("TAX_RATE", defaults.research.tax_rate)?,
            high_growth_years: read.or("HIGH_GROWTH_YEARS", defaults.research.high_growth_years)?,
            start_year: read.or("VALUATION_START_YEAR", defaults.research.start_year)?,
            growth_floor: read.or("GROWTH_FLOOR", defaults.research.growth_floor)?,
            include_subject_in_baseline: read.or(
                "INCLUDE_SUBJECT_IN_BASELINE",
                defaults.research.include_subject_in_baseline,
            )?,
            rank_recommendations: read.or(
                "RANK_RECOMMENDATIONS",
                defaults.research.rank_recommendations,
            )?,
            peer_fetch_concurrency: read.or(
                "PEER_FETCH_CONCURRENCY",
                defaults.research.peer_fetch_concurrency,
            )?,
        };
        if research.high_growth_years == 0 {
            return Err(ResearchError::invalid_parameter("HIGH_GROWTH_YEARS", "must be at least 1"));
        }
        if research.peer_fetch_concurrency == 0 {
            return Err(ResearchError::invalid_parameter(
                "PEER_FETCH_CONCURRENCY",
                "must be at least 1",
            ));
        }

        let config = AppConfig {
            port: read.or("PORT", defaults.port)?,
            universe_path: read.or("UNIVERSE_PATH", defaults.universe_path)?,
            research,
            fetch: FetchConfig {
                timeout: Duration::from_secs(
                    read.or("FETCH_TIMEOUT_SECS", defaults.fetch.timeout.as_secs())?,
                ),
                backoff,
                beta_benchmark: read.or("BETA_BENCHMARK", defaults.fetch.beta_benchmark)?,
            },
        };
        info!("Configuration loaded: {:?}", config);
        Ok(config)
    }
}

struct Reader<'a, F> {
    lookup: &'a F,
}

impl<F> Reader<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr + std::fmt::Debug,
    {
        match (self.lookup)(key) {
            Some(raw) => raw.trim().parse::<T>().map_err(|_| {
                ResearchError::invalid_parameter(key, format!("cannot parse '{}'", raw))
            }),
            None => {
                warn!("${} not set, defaulting to {:?}", key, default);
                Ok(default)
            }
        }
    }
}
