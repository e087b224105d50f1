//! Provider adapters: one per ETF issuer.
//!
//! Every adapter satisfies the [`HoldingsProvider`] contract: fetch the
//! issuer's disclosure document, discover the real data table inside it,
//! and emit canonical [`Holding`] records. The discovery heuristics differ
//! per source (metadata preambles, nested layout tables, content-type
//! dependent formats); the output contract and the failure model do not.

pub mod ark;
pub mod firsttrust;
pub mod globalx;
pub mod invesco;
pub mod ishares;
pub mod pacer;
pub mod ssga;
pub mod vaneck;

mod traits;

pub use traits::HoldingsProvider;

use crate::errors::HoldingsError;
use crate::models::Holding;
use crate::parse::ParsedTable;

/// Build holdings from a filtered table: one record per row whose weight
/// cell coerces to a number.
pub(crate) fn collect_holdings(
    ticker: &str,
    table: &ParsedTable,
    holding_col: usize,
    weight_col: usize,
) -> Vec<Holding> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let weight = row.get(weight_col)?.as_decimal()?;
            let holding_id = row
                .get(holding_col)
                .map(|cell| cell.display_string())
                .unwrap_or_default();
            Some(Holding::new(ticker, holding_id, weight))
        })
        .collect()
}

/// Predictable-URL sources answer 404 for funds they do not carry; surface
/// that as the ticker-level error rather than a bare HTTP status.
pub(crate) fn not_found_on_404(
    error: HoldingsError,
    provider: &str,
    ticker: &str,
) -> HoldingsError {
    match error {
        HoldingsError::HttpStatus { status: 404, .. } => HoldingsError::TickerNotFound {
            provider: provider.to_string(),
            ticker: ticker.to_string(),
        },
        other => other,
    }
}
