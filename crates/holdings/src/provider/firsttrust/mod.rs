//! First Trust provider implementation.
//!
//! First Trust serves holdings as an HTML page whose data table sits deep
//! inside nested layout tables:
//!
//! `https://www.ftportfolios.com/Retail/Etf/EtfHoldings.aspx?Ticker={ticker}`
//!
//! The real table is the one whose DIRECT rows start with `Identifier` and
//! `Weighting` header cells. Matching on direct children only keeps an
//! outer layout table, whose cells contain the entire inner table's text,
//! from being selected. Weights are `"4.51%"` strings.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::HoldingsError;
use crate::fetch::FetchClient;
use crate::models::Holding;
use crate::parse::parse_html_table;
use crate::provider::{collect_holdings, HoldingsProvider};

const PROVIDER_ID: &str = "FIRSTTRUST";
const PROVIDER_NAME: &str = "First Trust";

const HOLDINGS_URL_TEMPLATE: &str =
    "https://www.ftportfolios.com/Retail/Etf/EtfHoldings.aspx?Ticker={ticker}";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Header cells identifying the holdings table, matched by whole-cell
/// equality against direct rows.
const HEADER_LABELS: &[&[&str]] = &[&["Identifier"], &["Weighting"]];

/// Known First Trust ETF tickers. Not exhaustive: the adapter attempts
/// any ticker, this list only backs `supported_tickers`.
const KNOWN_TICKERS: &[&str] = &[
    "AIRR", "CIBR", "CLOU", "FDN", "FPRO", "FTEC", "FTXL",
    "LEGR", "LMBS", "MILN", "SKYY", "WNDY",
];

/// First Trust provider: nested-HTML table extraction.
pub struct FirstTrustProvider {
    fetch: FetchClient,
}

impl Default for FirstTrustProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FirstTrustProvider {
    pub fn new() -> Self {
        Self {
            fetch: FetchClient::new(),
        }
    }

    fn parse_holdings(ticker: &str, html: &str) -> Result<Vec<Holding>, HoldingsError> {
        let mut table = parse_html_table(html, HEADER_LABELS)?;

        let weight_col =
            table
                .column_equals("weighting")
                .ok_or_else(|| HoldingsError::HeaderNotFound {
                    message: format!("no weighting column among {:?}", table.headers),
                })?;
        let holding_col =
            table
                .column_equals("identifier")
                .ok_or_else(|| HoldingsError::HeaderNotFound {
                    message: format!("no identifier column among {:?}", table.headers),
                })?;

        table.retain_numeric_rows(weight_col);
        Ok(collect_holdings(ticker, &table, holding_col, weight_col))
    }
}

#[async_trait]
impl HoldingsProvider for FirstTrustProvider {
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

        let document = self.fetch.get(&url, &[], DOWNLOAD_TIMEOUT).await?;

        Self::parse_holdings(&ticker, &document.text()).map_err(|e| match e {
            // no matching table on the page means the ticker is not theirs
            HoldingsError::HeaderNotFound { .. } => HoldingsError::TickerNotFound {
                provider: PROVIDER_NAME.to_string(),
                ticker: ticker.clone(),
            },
            other => other,
        })
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
