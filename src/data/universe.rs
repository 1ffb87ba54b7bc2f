//! Ticker universe loading and provider symbol mapping.

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("failed to read ticker list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("ticker list {path} is empty")]
    Empty { path: PathBuf },
}

/// Read tickers from the first column of a headerless CSV. Blank rows are
/// skipped and the first occurrence of a ticker wins.
pub fn parse_universe<R: Read>(reader: R) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut seen = HashSet::new();
    let mut tickers = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(ticker) = record.get(0).filter(|t| !t.is_empty()) else {
            continue;
        };
        if seen.insert(ticker.to_string()) {
            tickers.push(ticker.to_string());
        }
    }
    Ok(tickers)
}

pub fn load_universe(path: &Path) -> Result<Vec<String>, UniverseError> {
    let file = std::fs::File::open(path).map_err(|e| UniverseError::Read {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    let tickers = parse_universe(file).map_err(|source| UniverseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if tickers.is_empty() {
        return Err(UniverseError::Empty {
            path: path.to_path_buf(),
        });
    }
    info!(path = %path.display(), count = tickers.len(), "loaded ticker universe");
    Ok(tickers)
}

/// Provider symbol for a universe ticker. Index tickers (`^...`) are used as is,
/// everything else gets the exchange suffix.
pub fn provider_symbol(ticker: &str, suffix: &str) -> String {
    if ticker.starts_with('^') {
        ticker.to_string()
    } else {
        format!("{ticker}{suffix}")
    }
}
