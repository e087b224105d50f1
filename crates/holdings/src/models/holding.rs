//! The canonical holding record every provider adapter emits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One constituent asset of a fund, with its weight in the fund.
///
/// Produced by exactly one adapter call and immutable once returned.
/// `holding_id` semantics vary by provider (a stock symbol, a CUSIP, or a
/// security name), so only issuer-level consistency is guaranteed, never
/// cross-provider identity.
///
/// The serde field names match the tabular output boundary
/// (`ETF Ticker, Holding, Weight`), so a `csv::Writer` emits the expected
/// header directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker of the fund this holding belongs to
    #[serde(rename = "ETF Ticker")]
    pub etf_ticker: String,

    /// Provider-scoped identifier of the held asset
    #[serde(rename = "Holding")]
    pub holding_id: String,

    /// Portfolio share as a percentage in [0, 100]
    #[serde(rename = "Weight")]
    pub weight: Decimal,
}

impl Holding {
    pub fn new(etf_ticker: impl Into<String>, holding_id: impl Into<String>, weight: Decimal) -> Self {
        Self {
            etf_ticker: etf_ticker.into(),
            holding_id: holding_id.into(),
            weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_csv_serialization_uses_boundary_headers() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer
            .serialize(Holding::new("SPY", "AAPL", dec!(6.71)))
            .unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(out, "ETF Ticker,Holding,Weight\nSPY,AAPL,6.71\n");
    }
}
