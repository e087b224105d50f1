//! Error types and retry classification for the holdings crate.
//!
//! This module provides:
//! - [`HoldingsError`]: The main error enum for all holdings operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching, parsing, or aggregating holdings.
///
/// Each variant is classified via [`retry_class`](Self::retry_class), which
/// the fetch client consults before sleeping and retrying a request.
#[derive(Error, Debug)]
pub enum HoldingsError {
    /// The request exceeded its per-call timeout.
    /// Aborts the current row only; the batch continues.
    #[error("Timeout fetching {url}")]
    Timeout {
        /// The URL that timed out
        url: String,
    },

    /// The server answered with a non-success HTTP status.
    /// 429 and 5xx are transient; everything else is terminal.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The URL that was requested
        url: String,
        /// The HTTP status code returned
        status: u16,
    },

    /// A transport-level error occurred (DNS, connect, TLS, body read).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// No row in the document matched the required header labels.
    /// Retrying the identical payload cannot fix a structural mismatch.
    #[error("Header row not found: {message}")]
    HeaderNotFound {
        /// What was searched for and where
        message: String,
    },

    /// The document contained no rows at all.
    /// Distinct from a successfully parsed table with zero data rows.
    #[error("Document contains no table rows")]
    EmptyTable,

    /// The payload could not be opened or decoded as the expected format.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The ticker has no entry in the provider's ticker→location map.
    /// A configuration gap, terminal for that ticker; guessing a URL could
    /// silently return another fund's data.
    #[error("Ticker '{ticker}' has no configured location for {provider}; add it to the location map")]
    UnmappedTicker {
        /// The provider missing the mapping
        provider: String,
        /// The unmapped ticker
        ticker: String,
    },

    /// The provider answered but does not carry this fund.
    #[error("Ticker '{ticker}' not found at {provider}")]
    TickerNotFound {
        /// The provider that was queried
        provider: String,
        /// The unknown ticker
        ticker: String,
    },

    /// A provider-specific failure: unexpected payload shape, missing
    /// fields, a download link that could not be located, etc.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that failed
        provider: String,
        /// What went wrong
        message: String,
    },

    /// The registry has no provider under the given key or alias.
    #[error("Unknown provider: '{0}'")]
    UnknownProvider(String),
}

impl HoldingsError {
    /// Returns the retry classification for this error.
    ///
    /// Only HTTP 429 and 5xx responses are transient; all other failures,
    /// including timeouts and structural parse errors, are terminal for the
    /// current call.
    ///
    /// # Examples
    ///
    /// ```
    /// use etfolio_holdings::errors::{HoldingsError, RetryClass};
    ///
    /// let error = HoldingsError::HttpStatus { url: "https://x".into(), status: 503 };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = HoldingsError::EmptyTable;
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::HttpStatus { status, .. } if *status == 429 || (500..=599).contains(status) => {
                RetryClass::WithBackoff
            }
            _ => RetryClass::Never,
        }
    }
}
