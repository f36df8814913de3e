// src/error.rs
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which computation a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CostOfCapital,
    GrowthRate,
    Valuation,
    Recommendation,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Step::CostOfCapital => "cost of capital",
            Step::GrowthRate => "growth rate",
            Step::Valuation => "valuation",
            Step::Recommendation => "recommendation",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResearchError {
    #[error("Date must be entered as YYYY-MM-DD, got '{input}'")]
    InvalidDateFormat { input: String },

    #[error("{ticker}: {step} is undefined: {detail}")]
    DivisionUndefined {
        ticker: String,
        step: Step,
        detail: String,
    },

    #[error("{ticker}: terminal value undefined, long-term rate {long_term_rate} must exceed long-term growth {long_term_growth}")]
    TerminalValueUndefined {
        ticker: String,
        long_term_rate: f64,
        long_term_growth: f64,
    },

    #[error("{ticker}: {series} history has {periods} usable period(s), need at least 2")]
    InsufficientHistory {
        ticker: String,
        series: &'static str,
        periods: usize,
    },

    #[error("No peers available for industry '{industry}'")]
    NoPeers { industry: String },

    #[error("{ticker}: data fetch failed: {reason}")]
    DataFetch { ticker: String, reason: String },

    #[error("Unknown ticker '{ticker}'")]
    UnknownTicker { ticker: String },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Ticker universe error: {reason}")]
    Universe { reason: String },
}

impl ResearchError {
    /// Short machine-readable tag, used in API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ResearchError::InvalidDateFormat { .. } => "invalid_date_format",
            ResearchError::DivisionUndefined { .. } => "division_undefined",
            ResearchError::TerminalValueUndefined { .. } => "terminal_value_undefined",
            ResearchError::InsufficientHistory { .. } => "insufficient_history",
            ResearchError::NoPeers { .. } => "no_peers",
            ResearchError::DataFetch { .. } => "data_fetch_failure",
            ResearchError::UnknownTicker { .. } => "unknown_ticker",
            ResearchError::InvalidParameter { .. } => "invalid_parameter",
            ResearchError::Universe { .. } => "universe",
        }
    }

    pub(crate) fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ResearchError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn data_fetch(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        ResearchError::DataFetch {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResearchError>;
