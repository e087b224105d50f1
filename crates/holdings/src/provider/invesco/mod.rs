//! Invesco provider implementation.
//!
//! Invesco's own holdings downloads sit behind a session wall, so this
//! adapter reads the fund's top holdings from Yahoo Finance's public
//! quoteSummary API instead. The API is structured JSON with no document
//! discovery, but it only carries the top 10 holdings, never the full
//! list; the aggregator's padding covers the unknown remainder.
//!
//! # API Endpoint
//!
//! `https://query1.finance.yahoo.com/v10/finance/quoteSummary/{ticker}?modules=topHoldings`
//!
//! # Response Format
//!
//! Holdings arrive under `quoteSummary.result[0].topHoldings.holdings`,
//! each with `symbol`, `holdingName`, and `holdingPercent` as a
//! formatted-value object whose `raw` field is a fraction in [0, 1].

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::HoldingsError;
use crate::fetch::FetchClient;
use crate::models::Holding;
use crate::provider::HoldingsProvider;

const PROVIDER_ID: &str = "INVESCO";
const PROVIDER_NAME: &str = "Invesco";

const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Known Invesco ETF tickers. Not exhaustive: the adapter attempts any
/// ticker, this list only backs `supported_tickers`.
const KNOWN_TICKERS: &[&str] = &[
    // NASDAQ / tech
    "QQQ", "QQQM", "QQQJ", "QQQA", "QQQN",
    // S&P 500
    "RSP", "SPGP",
    // equal weight sectors
    "RCD", "RGI", "RTM", "RYE", "RYF", "RYH", "RYT", "RYU",
    // dividend
    "PEY", "PFM", "PKW", "SPHD",
    // factor
    "PRF", "PRFZ", "DWAS", "OMFL",
    // fixed income
    "BSCM", "BSCN", "BSCO", "BSCP", "BSCQ", "BSCR", "BSCS", "BSCT", "BSCU",
    // international
    "PDN", "PXH", "PIZ", "PIE",
    // commodities
    "DBC", "DBB", "DBO", "DBP", "DBS",
    // other
    "PHO", "PBW", "PNQI", "CGW",
];

/// Envelope of the quoteSummary endpoint.
#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    /// One element per requested symbol; absent on errors
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    /// Error descriptor when the symbol is unknown
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "topHoldings", default)]
    top_holdings: Option<TopHoldings>,
}

#[derive(Debug, Deserialize)]
struct TopHoldings {
    #[serde(default)]
    holdings: Vec<ApiHolding>,
}

#[derive(Debug, Deserialize)]
struct ApiHolding {
    /// Constituent's exchange symbol
    #[serde(default)]
    symbol: Option<String>,
    /// Constituent's display name
    #[serde(rename = "holdingName", default)]
    holding_name: Option<String>,
    /// Portfolio share as a fraction in [0, 1]
    #[serde(rename = "holdingPercent", default)]
    holding_percent: Option<FormattedValue>,
}

/// Yahoo wraps numbers as `{"raw": 0.0905, "fmt": "9.05%"}`.
#[derive(Debug, Deserialize)]
struct FormattedValue {
    #[serde(default)]
    raw: Option<f64>,
}

/// A fraction in [0, 1] as a percentage, rounded past float noise.
fn fraction_to_percent(fraction: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(fraction).map(|d| (d * Decimal::ONE_HUNDRED).round_dp(6).normalize())
}

/// Invesco provider backed by Yahoo Finance's structured holdings data.
pub struct InvescoProvider {
    fetch: FetchClient,
}

impl Default for InvescoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InvescoProvider {
    pub fn new() -> Self {
        Self {
            fetch: FetchClient::new(),
        }
    }

    fn holdings_from_response(ticker: &str, body: &str) -> Result<Vec<Holding>, HoldingsError> {
        let envelope: QuoteSummaryEnvelope =
            serde_json::from_str(body).map_err(|e| HoldingsError::ProviderError {
                provider: PROVIDER_NAME.to_string(),
                message: format!("failed to parse response: {}", e),
            })?;

        let results = envelope
            .quote_summary
            .result
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                if envelope.quote_summary.error.is_some() {
                    HoldingsError::TickerNotFound {
                        provider: PROVIDER_NAME.to_string(),
                        ticker: ticker.to_string(),
                    }
                } else {
                    HoldingsError::ProviderError {
                        provider: PROVIDER_NAME.to_string(),
                        message: "empty quoteSummary result".to_string(),
                    }
                }
            })?;

        let top = results[0]
            .top_holdings
            .as_ref()
            .ok_or_else(|| HoldingsError::ProviderError {
                provider: PROVIDER_NAME.to_string(),
                message: "response carries no topHoldings module".to_string(),
            })?;

        let holdings: Vec<Holding> = top
            .holdings
            .iter()
            .filter_map(|h| {
                let weight = fraction_to_percent(h.holding_percent.as_ref()?.raw?)?;
                let holding_id = h
                    .symbol
                    .clone()
                    .or_else(|| h.holding_name.clone())?;
                Some(Holding::new(ticker, holding_id, weight))
            })
            .collect();

        if holdings.is_empty() {
            return Err(HoldingsError::ProviderError {
                provider: PROVIDER_NAME.to_string(),
                message: format!("no holdings data available for {}", ticker),
            });
        }

        Ok(holdings)
    }
}

#[async_trait]
impl HoldingsProvider for InvescoProvider {
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
        let url = format!("{}/{}", QUOTE_SUMMARY_URL, ticker);
        let query = [("modules", "topHoldings".to_string())];

        let document = self.fetch.get(&url, &query, REQUEST_TIMEOUT).await?;
        Self::holdings_from_response(&ticker, &document.text())
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
