//! Portfolio aggregation: batch holdings retrieval with weight
//! reconciliation.
//!
//! Consumes `(ticker, provider)` rows, invokes the adapters, and pads each
//! successful holdings set to 100% with a synthetic residual row so
//! downstream consumers can always assume full coverage. Individual row
//! failures are recorded and never abort the batch.
//!
//! Rows fetch concurrently up to a bounded limit, and results collect in
//! input row order regardless of completion order; a concurrency of 1
//! reproduces strictly sequential execution.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::errors::HoldingsError;
use crate::models::{Holding, LineStatus, PortfolioLine, PortfolioRequest, PortfolioSummary};
use crate::registry::ProviderRegistry;

/// Identifier of the synthetic residual holding appended when a fund's
/// reported weights fall short of 100%. For sources disclosing only their
/// top holdings it stands for "unknown remainder", not a literal asset.
pub const PADDING_HOLDING_ID: &str = "OTHER";

/// Tolerance, in percentage points, within which a total counts as 100%.
pub const WEIGHT_EPSILON: Decimal = dec!(0.01);

/// The full portfolio weight.
pub const FULL_WEIGHT: Decimal = dec!(100);

/// Concurrent fetches unless overridden.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Batch aggregator over a provider registry.
pub struct PortfolioService {
    registry: Arc<ProviderRegistry>,
    concurrency: usize,
}

impl PortfolioService {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Bound the number of in-flight fetches (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch and reconcile every row. Output order matches input order;
    /// one bad ticker never aborts the others.
    pub async fn get_portfolio(&self, rows: &[PortfolioRequest]) -> PortfolioSummary {
        let lines: Vec<PortfolioLine> = stream::iter(rows.iter().cloned())
            .map(|row| self.build_line(row))
            .buffered(self.concurrency)
            .collect()
            .await;

        let succeeded = lines.iter().filter(|line| line.status.is_ok()).count();
        let failed = lines.len() - succeeded;
        info!(
            "Portfolio batch complete: {} succeeded, {} failed",
            succeeded, failed
        );

        PortfolioSummary {
            lines,
            succeeded,
            failed,
        }
    }

    async fn build_line(&self, row: PortfolioRequest) -> PortfolioLine {
        match self.fetch_holdings(&row).await {
            Ok(holdings) => reconcile(&row, holdings),
            Err(e) => {
                warn!(
                    "Failed to fetch {} via '{}': {}",
                    row.etf_ticker, row.provider_key, e
                );
                PortfolioLine {
                    etf_ticker: row.etf_ticker,
                    provider_key: row.provider_key,
                    holdings: Vec::new(),
                    total_weight: Decimal::ZERO,
                    status: LineStatus::Failed(e.to_string()),
                }
            }
        }
    }

    async fn fetch_holdings(
        &self,
        row: &PortfolioRequest,
    ) -> Result<Vec<Holding>, HoldingsError> {
        let provider = self.registry.resolve(&row.provider_key)?;
        provider.get_holdings(&row.etf_ticker, None).await
    }
}

/// Pad the holdings to full weight when they fall short by more than the
/// epsilon; a total already within epsilon of 100% (or above it) is left
/// untouched.
fn reconcile(row: &PortfolioRequest, mut holdings: Vec<Holding>) -> PortfolioLine {
    let ticker = row.etf_ticker.trim().to_uppercase();
    let mut total: Decimal = holdings.iter().map(|h| h.weight).sum();

    if total < FULL_WEIGHT - WEIGHT_EPSILON {
        holdings.push(Holding::new(
            ticker.clone(),
            PADDING_HOLDING_ID,
            FULL_WEIGHT - total,
        ));
        total = FULL_WEIGHT;
    }

    PortfolioLine {
        etf_ticker: ticker,
        provider_key: row.provider_key.clone(),
        holdings,
        total_weight: total,
        status: LineStatus::Ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PortfolioRequest {
        PortfolioRequest::new("QQQ", "invesco")
    }

    fn holdings(weights: &[Decimal]) -> Vec<Holding> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| Holding::new("QQQ", format!("H{}", i), *w))
            .collect()
    }

    #[test]
    fn test_reconcile_pads_short_totals_to_full_weight() {
        let line = reconcile(&request(), holdings(&[dec!(60), dec!(35)]));
        assert_eq!(line.total_weight, dec!(100));
        assert_eq!(line.holdings.len(), 3);

        let padding = line.holdings.last().unwrap();
        assert_eq!(padding.holding_id, PADDING_HOLDING_ID);
        assert_eq!(padding.weight, dec!(5));
    }

    #[test]
    fn test_reconcile_skips_padding_within_epsilon() {
        let line = reconcile(&request(), holdings(&[dec!(60), dec!(39.995)]));
        assert_eq!(line.holdings.len(), 2);
        assert_eq!(line.total_weight, dec!(99.995));
    }

    #[test]
    fn test_reconcile_leaves_full_and_overweight_totals_alone() {
        let line = reconcile(&request(), holdings(&[dec!(100)]));
        assert_eq!(line.holdings.len(), 1);
        assert_eq!(line.total_weight, dec!(100));

        let line = reconcile(&request(), holdings(&[dec!(100.05)]));
        assert_eq!(line.holdings.len(), 1);
        assert_eq!(line.total_weight, dec!(100.05));
    }

    #[test]
    fn test_reconcile_padding_property() {
        // whenever the raw total is at most 100, the padded total is 100
        // within epsilon
        for raw in [dec!(0), dec!(12.5), dec!(50), dec!(95), dec!(99.98), dec!(100)] {
            let line = reconcile(&request(), holdings(&[raw]));
            assert!(
                (line.total_weight - dec!(100)).abs() <= WEIGHT_EPSILON,
                "raw total {} padded to {}",
                raw,
                line.total_weight
            );
        }
    }

    #[test]
    fn test_reconcile_uppercases_ticker() {
        let line = reconcile(
            &PortfolioRequest::new("qqq", "invesco"),
            holdings(&[dec!(95)]),
        );
        assert_eq!(line.etf_ticker, "QQQ");
        assert_eq!(line.holdings.last().unwrap().etf_ticker, "QQQ");
    }

    #[tokio::test]
    async fn test_batch_tolerates_per_row_failures() {
        // both rows fail before any network call: one ticker is unmapped,
        // one provider key is unknown
        let registry = Arc::new(ProviderRegistry::new());
        let service = PortfolioService::new(registry);

        let rows = vec![
            PortfolioRequest::new("ZZZZ", "vaneck"),
            PortfolioRequest::new("SPY", "vanguard"),
        ];
        let summary = service.get_portfolio(&rows).await;

        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 2);

        // output order matches input order
        assert_eq!(summary.lines[0].etf_ticker, "ZZZZ");
        assert_eq!(summary.lines[1].etf_ticker, "SPY");

        // failure reasons carry the typed error's display form
        match &summary.lines[0].status {
            LineStatus::Failed(reason) => assert!(reason.contains("no configured location")),
            LineStatus::Ok => panic!("expected failure"),
        }
        match &summary.lines[1].status {
            LineStatus::Failed(reason) => assert!(reason.contains("Unknown provider")),
            LineStatus::Ok => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_batch_with_sequential_concurrency() {
        let registry = Arc::new(ProviderRegistry::new());
        let service = PortfolioService::new(registry).with_concurrency(1);

        let rows = vec![PortfolioRequest::new("ZZZZ", "ark")];
        let summary = service.get_portfolio(&rows).await;
        assert_eq!(summary.failed, 1);
        assert!(summary.all_holdings().is_empty());
    }
}
