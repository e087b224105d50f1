//! iShares provider implementation.
//!
//! iShares has an enumerable product catalog: the download location of a
//! fund's holdings CSV is keyed by an opaque product id and URL slug, both
//! discoverable only from the product listing page. The listing is fetched
//! exactly once per provider instance and the resulting ticker→product
//! index is reused for every subsequent lookup, trading staleness risk for
//! skipping a ~90 second page load on each call.
//!
//! # Endpoints
//!
//! - Product listing: `https://www.ishares.com/us/products/etf-investments`
//! - Holdings CSV: `https://www.ishares.com/us/products/{product_id}/{slug}/1467271812596.ajax`
//!   with query `fileType=csv&fileName={ticker}_holdings&dataType=fund`
//!   and optional `asOfDate`; iShares is the one source honoring a
//!   historical date.
//!
//! # Document shape
//!
//! The CSV wraps the data table in a metadata preamble (fund name, as-of
//! date, inception date) and a quoted legal disclaimer after a blank line.
//! The header row is the first line carrying ticker, name, and weight
//! labels; weights are already numeric percentages.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use scraper::{Html, Selector};
use tokio::sync::OnceCell;

use crate::errors::HoldingsError;
use crate::fetch::{FetchClient, RetryPolicy};
use crate::models::Holding;
use crate::parse::{parse_csv, HeaderRule};
use crate::provider::{collect_holdings, HoldingsProvider};

const PROVIDER_ID: &str = "ISHARES";
const PROVIDER_NAME: &str = "iShares";

const PRODUCT_LISTING_URL: &str = "https://www.ishares.com/us/products/etf-investments";
/// Fixed ajax endpoint segment under each product page serving the CSV.
const HOLDINGS_ENDPOINT: &str = "1467271812596.ajax";

/// The listing page is slow; data downloads are not.
const LISTING_TIMEOUT: Duration = Duration::from_secs(90);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

const HEADER_LABELS: &[&[&str]] = &[&["ticker"], &["name"], &["weight"]];

lazy_static! {
    /// Product links look like `/us/products/{id}/{slug}`.
    static ref PRODUCT_LINK: Regex =
        Regex::new(r"/us/products/(\d+)/([a-z0-9-]+)").unwrap();
    /// Ticker anchors carry 1-5 uppercase letters as their text.
    static ref TICKER_TEXT: Regex = Regex::new(r"^[A-Z]{1,5}$").unwrap();
}

/// Where one fund's holdings live, derived from the listing page.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductEntry {
    pub product_id: String,
    pub slug: String,
}

/// iShares provider with a once-per-instance product index cache.
pub struct ISharesProvider {
    fetch: FetchClient,
    retry: RetryPolicy,
    index: OnceCell<HashMap<String, ProductEntry>>,
}

impl Default for ISharesProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ISharesProvider {
    pub fn new() -> Self {
        Self {
            fetch: FetchClient::new(),
            retry: RetryPolicy::default(),
            index: OnceCell::new(),
        }
    }

    /// The ticker→product index, fetching the listing page on first use.
    ///
    /// `OnceCell` guarantees a single population even under concurrent
    /// first access; afterwards the index is read-only with no expiry for
    /// the life of the instance.
    async fn product_index(&self) -> Result<&HashMap<String, ProductEntry>, HoldingsError> {
        self.index
            .get_or_try_init(|| async {
                let document = self
                    .fetch
                    .get_with_retry(PRODUCT_LISTING_URL, &[], LISTING_TIMEOUT, self.retry)
                    .await?;
                let index = extract_index(&document.text())?;
                info!("Loaded iShares product index: {} funds", index.len());
                Ok(index)
            })
            .await
    }

    fn parse_holdings(ticker: &str, text: &str) -> Result<Vec<Holding>, HoldingsError> {
        let mut table = parse_csv(text, &HeaderRule::Scan(HEADER_LABELS))?;

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

/// Scrape ticker→product entries from the listing page: anchors whose href
/// matches the product-link pattern and whose text is a plausible ticker.
fn extract_index(html: &str) -> Result<HashMap<String, ProductEntry>, HoldingsError> {
    let document = Html::parse_document(html);
    let anchors =
        Selector::parse("a[href]").map_err(|e| HoldingsError::InvalidDocument(e.to_string()))?;

    let mut index = HashMap::new();
    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(captures) = PRODUCT_LINK.captures(href) else {
            continue;
        };
        let ticker: String = element.text().collect::<String>().trim().to_uppercase();
        if TICKER_TEXT.is_match(&ticker) {
            index.insert(
                ticker,
                ProductEntry {
                    product_id: captures[1].to_string(),
                    slug: captures[2].to_string(),
                },
            );
        }
    }
    Ok(index)
}

#[async_trait]
impl HoldingsProvider for ISharesProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn get_holdings(
        &self,
        ticker: &str,
        as_of_date: Option<NaiveDate>,
    ) -> Result<Vec<Holding>, HoldingsError> {
        let ticker = ticker.trim().to_uppercase();

        let entry = self
            .product_index()
            .await?
            .get(&ticker)
            .cloned()
            .ok_or_else(|| HoldingsError::TickerNotFound {
                provider: PROVIDER_NAME.to_string(),
                ticker: ticker.clone(),
            })?;

        let url = format!(
            "https://www.ishares.com/us/products/{}/{}/{}",
            entry.product_id, entry.slug, HOLDINGS_ENDPOINT
        );
        let mut query: Vec<(&str, String)> = vec![
            ("fileType", "csv".to_string()),
            ("fileName", format!("{}_holdings", ticker)),
            ("dataType", "fund".to_string()),
        ];
        if let Some(date) = as_of_date {
            query.push(("asOfDate", date.format("%Y-%m-%d").to_string()));
        }

        let document = self
            .fetch
            .get_with_retry(&url, &query, DOWNLOAD_TIMEOUT, self.retry)
            .await?;

        Self::parse_holdings(&ticker, &document.text())
    }

    async fn supported_tickers(&self) -> Result<Vec<String>, HoldingsError> {
        let mut tickers: Vec<String> = self.product_index().await?.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}
