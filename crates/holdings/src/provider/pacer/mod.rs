//! Pacer ETFs provider implementation.
//!
//! Pacer publishes clean single-header CSVs at a predictable US Bank
//! hosting URL keyed by the uppercased ticker:
//!
//! `https://www.paceretfs.com/usbank/live/fsb0.pacer.x330.{ticker}_Holdings.csv`
//!
//! Weights are `"2.61%"` strings in the `Weightings` column; the numeric
//! filter keeps cash rows (they carry real weights) and drops footer
//! text. A 404 means the fund is not a Pacer ETF.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::HoldingsError;
use crate::fetch::FetchClient;
use crate::models::Holding;
use crate::parse::{parse_csv, HeaderRule};
use crate::provider::{collect_holdings, not_found_on_404, HoldingsProvider};

const PROVIDER_ID: &str = "PACER";
const PROVIDER_NAME: &str = "Pacer ETFs";

const HOLDINGS_URL_TEMPLATE: &str =
    "https://www.paceretfs.com/usbank/live/fsb0.pacer.x330.{ticker}_Holdings.csv";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Known Pacer ETF tickers. Not exhaustive: the adapter attempts any
/// ticker, this list only backs `supported_tickers`.
const KNOWN_TICKERS: &[&str] = &[
    // buffer series
    "BUFD", "BUFR", "BUFT", "BUFU",
    "PAUG", "PFEB", "PJAN", "PJUL",
    "PMAR", "PMAY", "PNOV", "POCT",
    "PSEP", "PAPR", "PDEC", "PJUN",
    // cash cows
    "CALF", "COWZ", "ICOW",
    // other strategies
    "EVNT", "IDOG", "LRGF", "QARP", "SRVR", "TRFK", "VIRS",
];

/// Pacer provider: predictable-URL single-header CSV.
pub struct PacerProvider {
    fetch: FetchClient,
}

impl Default for PacerProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PacerProvider {
    pub fn new() -> Self {
        Self {
            fetch: FetchClient::new(),
        }
    }

    fn parse_holdings(ticker: &str, text: &str) -> Result<Vec<Holding>, HoldingsError> {
        let mut table = parse_csv(text, &HeaderRule::FirstRow)?;

        let weight_col =
            table
                .column_equals("weightings")
                .ok_or_else(|| HoldingsError::HeaderNotFound {
                    message: format!("no weightings column among {:?}", table.headers),
                })?;
        let holding_col =
            table
                .column_equals("stockticker")
                .ok_or_else(|| HoldingsError::HeaderNotFound {
                    message: format!("no stock-ticker column among {:?}", table.headers),
                })?;

        table.retain_numeric_rows(weight_col);
        Ok(collect_holdings(ticker, &table, holding_col, weight_col))
    }
}

#[async_trait]
impl HoldingsProvider for PacerProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn get_holdings(
        &self,
        ticker: &str,
        _as_of_date: Option<NaiveDate>,
    ) -> Result<Vec<Holding>, HoldingsError> {
        let ticker = ticker.trim().to_uppercase();
        let url = HOLDINGS_URL_TEMPLATE.replace("{ticker}", &ticker);

        let document = self
            .fetch
            .get(&url, &[], DOWNLOAD_TIMEOUT)
            .await
            .map_err(|e| not_found_on_404(e, PROVIDER_NAME, &ticker))?;

        Self::parse_holdings(&ticker, &document.text())
    }

    async fn supported_tickers(&self) -> Result<Vec<String>, HoldingsError> {
        let mut tickers: Vec<String> = KNOWN_TICKERS.iter().map(|t| t.to_string()).collect();
        tickers.sort();
        tickers.dedup();
        Ok(tickers)
    }

    /// The catalog is open: any ticker may be attempted, the live request
    /// decides.
    async fn is_supported(&self, _ticker: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const PACER_CSV: &str = "\
Account,StockTicker,CUSIP,SecurityName,Shares,Price,MarketValue,Weightings
SRVR,EQIX,29444U700,EQUINIX INC,33172,\"$755.12\",\"$25,049,840\",15.21%
SRVR,DLR,253868103,DIGITAL REALTY TRUST,145210,\"$142.33\",\"$20,667,739\",12.55%
SRVR,Cash&Other,Cash&Other,Cash & Other,1647286,\"$1.00\",\"$1,647,286\",1.00%
";

    #[test]
    fn test_parse_holdings_single_header_csv() {
        let holdings = PacerProvider::parse_holdings("SRVR", PACER_CSV).unwrap();
        assert_eq!(holdings.len(), 3);
        assert_eq!(holdings[0], Holding::new("SRVR", "EQIX", dec!(15.21)));
        assert_eq!(holdings[1], Holding::new("SRVR", "DLR", dec!(12.55)));
        // cash rows carry a numeric weight, so the filter keeps them
        assert_eq!(holdings[2], Holding::new("SRVR", "Cash&Other", dec!(1.00)));
    }

    #[test]
    fn test_missing_weightings_column_is_typed() {
        let err =
            PacerProvider::parse_holdings("SRVR", "StockTicker,Weight\nEQIX,15.21%\n").unwrap_err();
        assert!(matches!(err, HoldingsError::HeaderNotFound { .. }));
    }

    #[tokio::test]
    async fn test_catalog_is_open() {
        let provider = PacerProvider::new();
        let tickers = provider.supported_tickers().await.unwrap();
        assert!(tickers.contains(&"SRVR".to_string()));
        assert!(provider.is_supported("UNKNOWN").await);
    }
}
