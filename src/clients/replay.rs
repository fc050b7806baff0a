// Recorded price feed for replays and tests

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use crate::clients::PriceSource;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Default)]
pub struct ReplayFeed {
    prices: VecDeque<f64>,
}

impl ReplayFeed {
    pub fn from_prices<I: IntoIterator<Item = f64>>(prices: I) -> Self {
        Self {
            prices: prices.into_iter().collect(),
        }
    }

    /// Load one price per line. CSV rows use their last column; blank lines,
    /// `#` comments and a non-numeric header row are skipped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> EngineResult<Self> {
        let mut prices = VecDeque::new();
        let mut seen_row = false;

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let field = line.rsplit(',').next().unwrap_or(line).trim();
            match field.parse::<f64>() {
                Ok(price) => prices.push_back(price),
                Err(_) if !seen_row => {} // header
                Err(_) => {
                    return Err(EngineError::FeedData(format!(
                        "line {}: '{}' is not a price",
                        number + 1,
                        field
                    )))
                }
            }
            seen_row = true;
        }

        Ok(Self { prices })
    }

    pub fn remaining(&self) -> usize {
        self.prices.len()
    }
}

impl Iterator for ReplayFeed {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.prices.pop_front()
    }
}

impl PriceSource for ReplayFeed {
    async fn next_price(&mut self) -> EngineResult<Option<f64>> {
        Ok(self.prices.pop_front())
    }
}
