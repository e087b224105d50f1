//! VanEck provider implementation.
//!
//! VanEck's download location is not derivable from the ticker: each fund
//! lives under a marketing slug, so a manual ticker→slug map is consulted
//! before any network call and an unmapped ticker fails immediately: a
//! guessed slug could silently return another fund's data.
//!
//! `https://www.vaneck.com/us/en/investments/{slug}/downloads/holdings/`
//!
//! The endpoint serves either an Excel workbook or CSV text; the response
//! Content-Type picks the parser. Weights come as `"9.00%"` strings in
//! CSV and numbers in Excel; both paths share one normalization.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::HoldingsError;
use crate::fetch::{Document, FetchClient};
use crate::models::Holding;
use crate::parse::{parse_csv, parse_workbook, HeaderRule, ParsedTable};
use crate::provider::{collect_holdings, not_found_on_404, HoldingsProvider};

const PROVIDER_ID: &str = "VANECK";
const PROVIDER_NAME: &str = "VanEck";

const HOLDINGS_URL_TEMPLATE: &str =
    "https://www.vaneck.com/us/en/investments/{slug}/downloads/holdings/";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

const HEADER_LABELS: &[&[&str]] = &[&["ticker", "name"], &["weight", "net assets"]];

/// Default ticker→slug map. Externally editable via
/// [`VanEckProvider::with_slug_map`]; to add a ticker, find the slug at
/// `vaneck.com/us/en/investments/{slug}/`.
const DEFAULT_SLUGS: &[(&str, &str)] = &[
    ("ANGL", "fallen-angel-high-yield-bond-etf-angl"),
    ("GDX", "gold-miners-etf-gdx"),
    ("GDXJ", "junior-gold-miners-etf-gdxj"),
    ("HYD", "high-yield-muni-etf-hyd"),
    ("ITM", "intermediate-muni-etf-itm"),
    ("MOAT", "morningstar-wide-moat-etf-moat"),
    ("NLR", "uranium-nuclear-energy-etf-nlr"),
    ("REMX", "rare-earth-strategic-metals-etf-remx"),
    ("SMH", "semiconductor-etf-smh"),
    ("VNM", "vietnam-etf-vnm"),
];

/// VanEck provider: manual location mapping, content-type dependent format.
pub struct VanEckProvider {
    fetch: FetchClient,
    slug_map: HashMap<String, String>,
}

impl Default for VanEckProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl VanEckProvider {
    pub fn new() -> Self {
        Self::with_slug_map(
            DEFAULT_SLUGS
                .iter()
                .map(|(t, s)| (t.to_string(), s.to_string()))
                .collect(),
        )
    }

    /// Construct with an externally loaded ticker→slug map.
    pub fn with_slug_map(slug_map: HashMap<String, String>) -> Self {
        Self {
            fetch: FetchClient::new(),
            slug_map,
        }
    }

    fn parse_document(ticker: &str, document: &Document) -> Result<Vec<Holding>, HoldingsError> {
        let rule = HeaderRule::Scan(HEADER_LABELS);
        let table = if document.is_excel() {
            parse_workbook(&document.bytes, &rule)?
        } else {
            parse_csv(&document.text(), &rule)?
        };
        Self::normalize(ticker, table)
    }

    fn normalize(ticker: &str, mut table: ParsedTable) -> Result<Vec<Holding>, HoldingsError> {
        let weight_col = table
            .column_containing("weight")
            .or_else(|| table.column_containing("net assets"))
            .ok_or_else(|| HoldingsError::HeaderNotFound {
                message: format!("no weight column among {:?}", table.headers),
            })?;
        // prefer the ticker column for the identifier, fall back to name
        let holding_col = table
            .column_equals("ticker")
            .or_else(|| table.column_containing("name"))
            .ok_or_else(|| HoldingsError::HeaderNotFound {
                message: format!("no ticker or name column among {:?}", table.headers),
            })?;

        table.retain_numeric_rows(weight_col);
        Ok(collect_holdings(ticker, &table, holding_col, weight_col))
    }
}

#[async_trait]
impl HoldingsProvider for VanEckProvider {
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

        let slug = self
            .slug_map
            .get(&ticker)
            .ok_or_else(|| HoldingsError::UnmappedTicker {
                provider: PROVIDER_NAME.to_string(),
                ticker: ticker.clone(),
            })?;

        let url = HOLDINGS_URL_TEMPLATE.replace("{slug}", slug);
        let document = self
            .fetch
            .get(&url, &[], DOWNLOAD_TIMEOUT)
            .await
            .map_err(|e| not_found_on_404(e, PROVIDER_NAME, &ticker))?;

        Self::parse_document(&ticker, &document)
    }

    async fn supported_tickers(&self) -> Result<Vec<String>, HoldingsError> {
        let mut tickers: Vec<String> = self.slug_map.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_unmapped_ticker_fails_without_network() {
        let provider = VanEckProvider::new();
        let err = provider.get_holdings("ZZZZ", None).await.unwrap_err();
        assert!(matches!(
            err,
            HoldingsError::UnmappedTicker { ref ticker, .. } if ticker == "ZZZZ"
        ));
    }

    #[tokio::test]
    async fn test_supported_tickers_come_from_the_map() {
        let provider = VanEckProvider::new();
        let tickers = provider.supported_tickers().await.unwrap();
        assert_eq!(
            tickers,
            vec!["ANGL", "GDX", "GDXJ", "HYD", "ITM", "MOAT", "NLR", "REMX", "SMH", "VNM"]
        );
        assert!(provider.is_supported("smh").await);
        assert!(!provider.is_supported("SPY").await);
    }

    #[tokio::test]
    async fn test_external_map_overrides_defaults() {
        let provider = VanEckProvider::with_slug_map(HashMap::from([(
            "XYZ".to_string(),
            "some-new-fund-etf-xyz".to_string(),
        )]));
        assert_eq!(provider.supported_tickers().await.unwrap(), vec!["XYZ"]);
        assert!(matches!(
            provider.get_holdings("SMH", None).await.unwrap_err(),
            HoldingsError::UnmappedTicker { .. }
        ));
    }

    #[test]
    fn test_csv_document_with_percent_weights() {
        let document = Document {
            content_type: Some("text/csv".to_string()),
            bytes: b"Fund Holdings\nAs of 07/30/2026\n\nTicker,Name,Shares,% of Net Assets\nNVDA,NVIDIA CORP,1000,20.35%\nTSM,TAIWAN SEMICONDUCTOR,800,12.90%\nCash,U.S. Dollar,,--\n"
                .to_vec(),
        };
        let holdings = VanEckProvider::parse_document("SMH", &document).unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0], Holding::new("SMH", "NVDA", dec!(20.35)));
        assert_eq!(holdings[1], Holding::new("SMH", "TSM", dec!(12.90)));
    }

    #[test]
    fn test_identifier_falls_back_to_name_column() {
        let document = Document {
            content_type: Some("text/csv".to_string()),
            bytes: b"Name,Weighting\nNVIDIA CORP,20.35%\nTAIWAN SEMICONDUCTOR,12.90%\n".to_vec(),
        };
        let holdings = VanEckProvider::parse_document("SMH", &document).unwrap();
        assert_eq!(holdings[0].holding_id, "NVIDIA CORP");
    }
}
