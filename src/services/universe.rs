// src/services/universe.rs
use csv::Reader;
use log::info;
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{ResearchError, Result};
use crate::models::{IndustryClass, TickerRecord};

/// Static table of tickers with their company, industry and founding year.
#[derive(Debug, Clone)]
pub struct TickerUniverse {
    records: Vec<TickerRecord>,
    by_ticker: HashMap<String, usize>,
}

static TICKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9.\-]{0,9}$").unwrap());

pub fn normalize_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim().to_uppercase();
    if TICKER_PATTERN.is_match(&ticker) {
        Ok(ticker)
    } else {
        Err(ResearchError::invalid_parameter(
            "ticker",
            format!("'{}' is not a valid symbol", raw.trim()),
        ))
    }
}

impl TickerUniverse {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading ticker universe from {}", path.display());
        let file = File::open(path).map_err(|e| ResearchError::Universe {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = Reader::from_reader(reader);
        let mut records = Vec::new();
        for row in rdr.deserialize::<TickerRecord>() {
            let mut record = row.map_err(|e| ResearchError::Universe {
                reason: e.to_string(),
            })?;
            record.ticker = normalize_ticker(&record.ticker).map_err(|e| ResearchError::Universe {
                reason: e.to_string(),
            })?;
            record.company = record.company.trim().to_string();
            record.industry = record.industry.trim().to_string();
            records.push(record);
        }
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<TickerRecord>) -> Result<Self> {
        let mut by_ticker = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if by_ticker.insert(record.ticker.clone(), idx).is_some() {
                return Err(ResearchError::Universe {
                    reason: format!("ticker {} is listed more than once", record.ticker),
                });
            }
        }
        info!("Ticker universe has {} companies", records.len());
        Ok(Self { records, by_ticker })
    }

    pub fn records(&self) -> &[TickerRecord] {
        &self.records
    }

    pub fn lookup(&self, ticker: &str) -> Result<&TickerRecord> {
        let key = ticker.trim().to_uppercase();
        self.by_ticker
            .get(&key)
            .map(|&idx| &self.records[idx])
            .ok_or(ResearchError::UnknownTicker { ticker: key })
    }

    pub fn industry_of(&self, ticker: &str) -> Result<&str> {
        self.lookup(ticker).map(|r| r.industry.as_str())
    }

    /// Members of `industry` in table order.
    pub fn peers(&self, industry: &str) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.industry == industry)
            .map(|r| r.ticker.clone())
            .collect()
    }

    /// Every industry with its members, in order of first appearance.
    pub fn industries(&self) -> Vec<IndustryClass> {
        let mut classes: Vec<IndustryClass> = Vec::new();
        for record in &self.records {
            match classes.iter_mut().find(|c| c.label == record.industry) {
                Some(class) => class.tickers.push(record.ticker.clone()),
                None => classes.push(IndustryClass {
                    label: record.industry.clone(),
                    tickers: vec![record.ticker.clone()],
                }),
            }
        }
        classes
    }

    /// Case-insensitive match on ticker prefix or company name substring.
    pub fn search(&self, query: &str) -> Vec<&TickerRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.records
            .iter()
            .filter(|r| {
                r.ticker.to_lowercase().starts_with(&needle)
                    || r.company.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Ticker,Company,Industry,Founded
AAPL,Apple Inc.,Technology Hardware,1976
msft ,Microsoft Corp.,Software,1975
HPQ,HP Inc.,Technology Hardware,1939
ORCL,Oracle Corp.,Software,
";

    fn universe() -> TickerUniverse {
        TickerUniverse::from_reader(TABLE.as_bytes()).unwrap()
    }

    #[test]
    fn loads_and_normalizes() {
        let u = universe();
        assert_eq!(u.records().len(), 4);
        let msft = u.lookup("msft").unwrap();
        assert_eq!(msft.ticker, "MSFT");
        assert_eq!(msft.industry, "Software");
        assert_eq!(msft.founded.as_deref(), Some("1975"));
    }

    #[test]
    fn unknown_ticker() {
        assert_eq!(
            universe().lookup("ZZZZ").unwrap_err(),
            ResearchError::UnknownTicker {
                ticker: "ZZZZ".to_string()
            }
        );
    }

    #[test]
    fn peers_keep_table_order() {
        let u = universe();
        assert_eq!(u.peers("Technology Hardware"), vec!["AAPL", "HPQ"]);
        assert_eq!(u.industry_of("ORCL").unwrap(), "Software");
        assert_eq!(u.industry_of("zzzz").unwrap_err().kind(), "unknown_ticker");
        assert!(u.peers("Utilities").is_empty());

        let industries = u.industries();
        assert_eq!(industries.len(), 2);
        assert_eq!(industries[0].label, "Technology Hardware");
        assert_eq!(industries[1].tickers, vec!["MSFT", "ORCL"]);
    }

    #[test]
    fn duplicate_ticker_is_rejected() {
        let table = "Ticker,Company,Industry,Founded\nAAPL,Apple,Tech,1976\nAAPL,Apple,Retail,1976\n";
        let err = TickerUniverse::from_reader(table.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), "universe");
    }

    #[test]
    fn search_by_prefix_or_name() {
        let u = universe();
        let hits: Vec<&str> = u.search("or").iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(hits, vec!["MSFT", "ORCL"]);
        assert!(u.search("  ").is_empty());
    }

    #[test]
    fn ticker_validation() {
        assert_eq!(normalize_ticker(" brk.b ").unwrap(), "BRK.B");
        assert!(normalize_ticker("1ABC").is_err());
        assert!(normalize_ticker("A B").is_err());
    }
}
