//! The provider trait every issuer adapter implements.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::HoldingsError;
use crate::models::Holding;

/// Trait for ETF holdings providers.
///
/// Implement this trait to add support for a new issuer. The registry
/// holds one shared instance per adapter so adapter-local caches survive
/// across lookups.
///
/// An advertised catalog is not a fetch capability: `supported_tickers`
/// may be a static illustrative list while `get_holdings` accepts any
/// ticker, with the live request deciding. Adapters with such open
/// catalogs override `is_supported` to return `true` unconditionally.
#[async_trait]
pub trait HoldingsProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "ISHARES" or "SSGA".
    /// Used as the registry's canonical key and in logging.
    fn id(&self) -> &'static str;

    /// Human-readable issuer name, e.g. "State Street (SPDR)".
    fn provider_name(&self) -> &'static str;

    /// Fetch, parse, and normalize the fund's current holdings.
    ///
    /// `as_of_date` is accepted by every adapter for interface uniformity
    /// but silently ignored by sources without a historical parameter
    /// (all but iShares).
    ///
    /// # Returns
    ///
    /// The fund's holdings as canonical records, or a typed
    /// [`HoldingsError`]. An empty vector means the source really listed
    /// zero holdings; structural failures never return empty.
    async fn get_holdings(
        &self,
        ticker: &str,
        as_of_date: Option<NaiveDate>,
    ) -> Result<Vec<Holding>, HoldingsError>;

    /// Best-effort catalog enumeration: the live index for sources that
    /// have one, a static illustrative list otherwise.
    async fn supported_tickers(&self) -> Result<Vec<String>, HoldingsError>;

    /// Whether this adapter claims the ticker. Default: membership in
    /// `supported_tickers`. Open-catalog adapters override to `true`.
    async fn is_supported(&self, ticker: &str) -> bool {
        match self.supported_tickers().await {
            Ok(tickers) => tickers.iter().any(|t| t.eq_ignore_ascii_case(ticker.trim())),
            Err(_) => false,
        }
    }

    /// Convenience: the `n` largest holdings by weight, descending.
    async fn top_holdings(
        &self,
        ticker: &str,
        n: usize,
    ) -> Result<Vec<Holding>, HoldingsError> {
        let mut holdings = self.get_holdings(ticker, None).await?;
        holdings.sort_by(|a, b| b.weight.cmp(&a.weight));
        holdings.truncate(n);
        Ok(holdings)
    }
}
