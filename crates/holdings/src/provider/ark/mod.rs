//! ARK Investment Management provider implementation.
//!
//! ARK publishes clean single-header CSVs on its asset host, but the file
//! name encodes the fund's marketing name, not the ticker, so a manual
//! ticker→filename map is consulted before any network call:
//!
//! `https://assets.ark-funds.com/fund-documents/funds-etf-csv/{filename}.csv`
//!
//! Weights come as `"9.95%"` strings; trailing disclaimer rows fail the
//! numeric weight filter.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::HoldingsError;
use crate::fetch::FetchClient;
use crate::models::Holding;
use crate::parse::{parse_csv, HeaderRule};
use crate::provider::{collect_holdings, not_found_on_404, HoldingsProvider};

const PROVIDER_ID: &str = "ARK";
const PROVIDER_NAME: &str = "ARK Investment Management";

const HOLDINGS_URL_TEMPLATE: &str =
    "https://assets.ark-funds.com/fund-documents/funds-etf-csv/{filename}.csv";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Default ticker→filename map (without the `.csv` extension). Externally
/// editable via [`ArkProvider::with_filename_map`]; to add a ticker, find
/// the filename at `ark-funds.com/download-fund-materials`.
const DEFAULT_FILENAMES: &[(&str, &str)] = &[
    ("ARKF", "ARK_FINTECH_INNOVATION_ETF_ARKF_HOLDINGS"),
    ("ARKG", "ARK_GENOMIC_REVOLUTION_ETF_ARKG_HOLDINGS"),
    ("ARKK", "ARK_INNOVATION_ETF_ARKK_HOLDINGS"),
    ("ARKQ", "ARK_AUTONOMOUS_TECH._&_ROBOTICS_ETF_ARKQ_HOLDINGS"),
    ("ARKW", "ARK_NEXT_GENERATION_INTERNET_ETF_ARKW_HOLDINGS"),
    ("ARKX", "ARK_SPACE_EXPLORATION_&_INNOVATION_ETF_ARKX_HOLDINGS"),
];

/// ARK provider: manual filename mapping, single-header CSV.
pub struct ArkProvider {
    fetch: FetchClient,
    filename_map: HashMap<String, String>,
}

impl Default for ArkProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ArkProvider {
    pub fn new() -> Self {
        Self::with_filename_map(
            DEFAULT_FILENAMES
                .iter()
                .map(|(t, f)| (t.to_string(), f.to_string()))
                .collect(),
        )
    }

    /// Construct with an externally loaded ticker→filename map.
    pub fn with_filename_map(filename_map: HashMap<String, String>) -> Self {
        Self {
            fetch: FetchClient::new(),
            filename_map,
        }
    }

    fn parse_holdings(ticker: &str, text: &str) -> Result<Vec<Holding>, HoldingsError> {
        let mut table = parse_csv(text, &HeaderRule::FirstRow)?;

        let weight_col =
            table
                .column_containing("weight")
                .ok_or_else(|| HoldingsError::HeaderNotFound {
                    message: format!("no weight column among {:?}", table.headers),
                })?;
        let holding_col =
            table
                .column_equals("ticker")
                .ok_or_else(|| HoldingsError::HeaderNotFound {
                    message: format!("no ticker column among {:?}", table.headers),
                })?;

        table.retain_numeric_rows(weight_col);
        Ok(collect_holdings(ticker, &table, holding_col, weight_col))
    }
}

#[async_trait]
impl HoldingsProvider for ArkProvider {
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

        let filename = self
            .filename_map
            .get(&ticker)
            .ok_or_else(|| HoldingsError::UnmappedTicker {
                provider: PROVIDER_NAME.to_string(),
                ticker: ticker.clone(),
            })?;

        let url = HOLDINGS_URL_TEMPLATE.replace("{filename}", filename);
        let document = self
            .fetch
            .get(&url, &[], DOWNLOAD_TIMEOUT)
            .await
            .map_err(|e| not_found_on_404(e, PROVIDER_NAME, &ticker))?;

        Self::parse_holdings(&ticker, &document.text())
    }

    async fn supported_tickers(&self) -> Result<Vec<String>, HoldingsError> {
        let mut tickers: Vec<String> = self.filename_map.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}
