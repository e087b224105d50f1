//! Global X provider implementation.
//!
//! Global X's full-holdings CSV lives at a dated asset URL that changes
//! daily, so the fund page is fetched first and the download link
//! extracted from it by pattern:
//!
//! 1. Fund page: `https://www.globalxetfs.com/funds/{ticker}`
//! 2. Holdings CSV: the first
//!    `https://assets.globalxetfs.com/funds/holdings/…full-holdings….csv`
//!    link found in the page source.
//!
//! The CSV carries exactly two metadata rows (fund name, as-of date)
//! before the header. Weights are numeric "% of Net Assets" values with
//! no percent sign.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::HoldingsError;
use crate::fetch::FetchClient;
use crate::models::Holding;
use crate::parse::{parse_csv, HeaderRule};
use crate::provider::{collect_holdings, not_found_on_404, HoldingsProvider};

const PROVIDER_ID: &str = "GLOBALX";
const PROVIDER_NAME: &str = "Global X";

const FUND_PAGE_URL: &str = "https://www.globalxetfs.com/funds/{ticker}";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Metadata rows above the header in the holdings CSV.
const METADATA_ROWS: usize = 2;

/// Known Global X ETF tickers. Not exhaustive: the adapter attempts any
/// ticker, this list only backs `supported_tickers`.
const KNOWN_TICKERS: &[&str] = &[
    "BOTZ", "CLOU", "DRIV", "FINX", "GNOM", "HERO",
    "LIT", "MILN", "POTX", "SNSR", "SOCL", "XITK",
];

lazy_static! {
    static ref HOLDINGS_LINK: Regex = Regex::new(
        r#"(?i)https://assets\.globalxetfs\.com/funds/holdings/[^"'<>\s]+full-holdings[^"'<>\s]*\.csv"#
    )
    .unwrap();
}

/// Global X provider: page-scrape then dated CSV download.
pub struct GlobalXProvider {
    fetch: FetchClient,
}

impl Default for GlobalXProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalXProvider {
    pub fn new() -> Self {
        Self {
            fetch: FetchClient::new(),
        }
    }

    fn extract_csv_url(page: &str) -> Option<&str> {
        HOLDINGS_LINK.find(page).map(|m| m.as_str())
    }

    fn parse_holdings(ticker: &str, text: &str) -> Result<Vec<Holding>, HoldingsError> {
        let mut table = parse_csv(text, &HeaderRule::SkipRows(METADATA_ROWS))?;

        let weight_col = table.column_containing("net assets").ok_or_else(|| {
            HoldingsError::HeaderNotFound {
                message: format!("no net-assets column among {:?}", table.headers),
            }
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
impl HoldingsProvider for GlobalXProvider {
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

        let page_url = FUND_PAGE_URL.replace("{ticker}", &ticker);
        let page = self
            .fetch
            .get(&page_url, &[], DOWNLOAD_TIMEOUT)
            .await
            .map_err(|e| not_found_on_404(e, PROVIDER_NAME, &ticker))?;

        let csv_url = Self::extract_csv_url(&page.text())
            .map(str::to_string)
            .ok_or_else(|| HoldingsError::ProviderError {
                provider: PROVIDER_NAME.to_string(),
                message: format!("no full-holdings CSV link on the {} fund page", ticker),
            })?;

        let document = self.fetch.get(&csv_url, &[], DOWNLOAD_TIMEOUT).await?;
        Self::parse_holdings(&ticker, &document.text())
    }

    async fn supported_tickers(&self) -> Result<Vec<String>, HoldingsError> {
        let mut tickers: Vec<String> = KNOWN_TICKERS.iter().map(|t| t.to_string()).collect();
        tickers.sort();
        Ok(tickers)
    }

    /// The catalog is open: any ticker may be attempted, the live request
    /// decides.
    async fn is_supported(&self, _ticker: &str) -> bool {
        true
    }
}
