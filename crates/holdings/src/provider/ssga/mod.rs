//! State Street (SPDR) provider implementation.
//!
//! SSGA publishes a daily holdings workbook at a predictable URL keyed by
//! the lowercased fund ticker:
//!
//! `https://www.ssga.com/library-content/products/fund-data/etfs/us/holdings-daily-us-en-{ticker}.xlsx`
//!
//! The workbook carries metadata rows above the header (fund name, as-of
//! date) and disclaimer rows below the data; the header is found by
//! scanning for name and weight labels, and footers fall to the numeric
//! weight filter. Weights are already numeric percentages. A 404 means
//! the fund is not a SPDR ETF.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::HoldingsError;
use crate::fetch::FetchClient;
use crate::models::Holding;
use crate::parse::{parse_workbook, HeaderRule, ParsedTable};
use crate::provider::{collect_holdings, not_found_on_404, HoldingsProvider};

const PROVIDER_ID: &str = "SSGA";
const PROVIDER_NAME: &str = "State Street (SPDR)";

const HOLDINGS_URL_TEMPLATE: &str =
    "https://www.ssga.com/library-content/products/fund-data/etfs/us/holdings-daily-us-en-{ticker}.xlsx";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

const HEADER_LABELS: &[&[&str]] = &[&["name"], &["weight"]];

/// Known SPDR ETF tickers. Not exhaustive: the adapter attempts any
/// ticker, this list only backs `supported_tickers`.
const KNOWN_TICKERS: &[&str] = &[
    // S&P index
    "SPY", "SPLG", "SPYG", "SPYV", "SPMD", "SPMV", "SPYD",
    // Dow Jones
    "DIA",
    // mid/small cap
    "MDY", "SLY",
    // sectors
    "XLB", "XLC", "XLE", "XLF", "XLI", "XLK", "XLP", "XLU", "XLV", "XLY", "XLRE",
    // international
    "CWI", "GWL", "GWX",
    // fixed income
    "BIL", "BWX", "FLRN", "JNK", "SJNK", "SPAB", "SPBO", "SPSB", "SPIB", "SPLB",
    "SPTL", "SPTS", "SPTI",
    // commodities
    "GLD", "GLDM",
    // real estate
    "RWR", "RWX",
    // industry
    "KBE", "KRE", "XAR", "XBI", "XHB", "XHE", "XHS", "XME", "XOP", "XPH",
    "XRT", "XSD", "XSW", "XTH", "XTL", "XTN",
];

/// SPDR provider: predictable-URL Excel downloads.
pub struct SsgaProvider {
    fetch: FetchClient,
}

impl Default for SsgaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SsgaProvider {
    pub fn new() -> Self {
        Self {
            fetch: FetchClient::new(),
        }
    }

    fn holdings_url(ticker: &str) -> String {
        HOLDINGS_URL_TEMPLATE.replace("{ticker}", &ticker.to_lowercase())
    }

    fn normalize(ticker: &str, mut table: ParsedTable) -> Result<Vec<Holding>, HoldingsError> {
        let weight_col =
            table
                .column_containing("weight")
                .ok_or_else(|| HoldingsError::HeaderNotFound {
                    message: format!("no weight column among {:?}", table.headers),
                })?;
        // the Name column is the holding identifier for SPDR documents
        let holding_col = table
            .column_equals("name")
            .or_else(|| table.column_containing("name"))
            .ok_or_else(|| HoldingsError::HeaderNotFound {
                message: format!("no name column among {:?}", table.headers),
            })?;

        table.retain_numeric_rows(weight_col);
        Ok(collect_holdings(ticker, &table, holding_col, weight_col))
    }
}

#[async_trait]
impl HoldingsProvider for SsgaProvider {
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
        let url = Self::holdings_url(&ticker);

        let document = self
            .fetch
            .get(&url, &[], DOWNLOAD_TIMEOUT)
            .await
            .map_err(|e| not_found_on_404(e, PROVIDER_NAME, &ticker))?;

        let table = parse_workbook(&document.bytes, &HeaderRule::Scan(HEADER_LABELS))?;
        Self::normalize(&ticker, table)
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
    use crate::parse::Cell;
    use rust_decimal_macros::dec;

    #[test]
    fn test_holdings_url_lowercases_ticker() {
        assert_eq!(
            SsgaProvider::holdings_url("XLF"),
            "https://www.ssga.com/library-content/products/fund-data/etfs/us/holdings-daily-us-en-xlf.xlsx"
        );
    }

    #[test]
    fn test_normalize_uses_name_column_and_drops_footers() {
        let table = ParsedTable {
            headers: vec![
                "Name".into(),
                "Ticker".into(),
                "Identifier".into(),
                "Weight".into(),
            ],
            rows: vec![
                vec![
                    Cell::Text("Apple Inc.".into()),
                    Cell::Text("AAPL".into()),
                    Cell::Text("037833100".into()),
                    Cell::Number(6.71),
                ],
                vec![
                    Cell::Text("Microsoft Corporation".into()),
                    Cell::Text("MSFT".into()),
                    Cell::Text("594918104".into()),
                    Cell::Number(6.25),
                ],
                vec![
                    Cell::Text("Past performance is not a reliable indicator.".into()),
                    Cell::Empty,
                    Cell::Empty,
                    Cell::Empty,
                ],
            ],
        };
        let holdings = SsgaProvider::normalize("SPY", table).unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0], Holding::new("SPY", "Apple Inc.", dec!(6.71)));
        assert_eq!(
            holdings[1],
            Holding::new("SPY", "Microsoft Corporation", dec!(6.25))
        );
    }

    #[test]
    fn test_normalize_without_weight_column_is_typed() {
        let table = ParsedTable {
            headers: vec!["Name".into(), "Shares".into()],
            rows: vec![],
        };
        let err = SsgaProvider::normalize("SPY", table).unwrap_err();
        assert!(matches!(err, HoldingsError::HeaderNotFound { .. }));
    }

    #[tokio::test]
    async fn test_catalog_is_open() {
        let provider = SsgaProvider::new();
        let tickers = provider.supported_tickers().await.unwrap();
        assert!(tickers.contains(&"SPY".to_string()));
        assert!(tickers.windows(2).all(|w| w[0] <= w[1]));
        // enumerated list is advisory; any ticker may be attempted
        assert!(provider.is_supported("TOTALLY-UNKNOWN").await);
    }
}
