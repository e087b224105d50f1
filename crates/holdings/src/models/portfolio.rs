//! Portfolio batch request and result models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Holding;

/// One row of a portfolio batch: which fund to fetch and from whom.
///
/// The serde field names match the batch input boundary, a two-column CSV
/// with header `ETF Ticker, Provider Name`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRequest {
    /// Ticker of the fund to fetch
    #[serde(rename = "ETF Ticker")]
    pub etf_ticker: String,

    /// Provider key or alias, matched through the registry's alias table
    #[serde(rename = "Provider Name")]
    pub provider_key: String,
}

impl PortfolioRequest {
    pub fn new(etf_ticker: impl Into<String>, provider_key: impl Into<String>) -> Self {
        Self {
            etf_ticker: etf_ticker.into(),
            provider_key: provider_key.into(),
        }
    }
}

/// Outcome of one portfolio row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LineStatus {
    /// Holdings were fetched and reconciled
    Ok,
    /// The row failed; the string is the error's display form
    Failed(String),
}

impl LineStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, LineStatus::Ok)
    }
}

/// Per-row result of a portfolio batch: the reconciled holdings of one fund,
/// or a recorded failure. Output order always matches input row order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PortfolioLine {
    /// Ticker of the fund
    pub etf_ticker: String,
    /// Provider key the row was requested with
    pub provider_key: String,
    /// Reconciled holdings; empty when the row failed
    pub holdings: Vec<Holding>,
    /// Sum of holding weights after padding
    pub total_weight: Decimal,
    /// Whether the row succeeded
    pub status: LineStatus,
}

impl PortfolioLine {
    /// Number of holdings on this line, padding row included.
    pub fn holdings_count(&self) -> usize {
        self.holdings.len()
    }

    /// Sum of the ten largest holding weights.
    pub fn top10_weight(&self) -> Decimal {
        let mut weights: Vec<Decimal> = self.holdings.iter().map(|h| h.weight).collect();
        weights.sort_unstable_by(|a, b| b.cmp(a));
        weights.into_iter().take(10).sum()
    }

    /// The single largest holding, if any.
    pub fn largest_holding(&self) -> Option<&Holding> {
        self.holdings.iter().max_by_key(|h| h.weight)
    }
}

/// Result of a whole portfolio batch: one line per input row plus run-level
/// counters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Per-row results in input order
    pub lines: Vec<PortfolioLine>,
    /// Rows whose status is `Ok`
    pub succeeded: usize,
    /// Rows whose status is `Failed`
    pub failed: usize,
}

impl PortfolioSummary {
    /// All holdings of all successful lines, flattened in line order.
    pub fn all_holdings(&self) -> Vec<Holding> {
        self.lines
            .iter()
            .filter(|line| line.status.is_ok())
            .flat_map(|line| line.holdings.iter().cloned())
            .collect()
    }
}
