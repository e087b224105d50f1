//! Resilient HTTP fetch layer.
//!
//! [`FetchClient`] wraps a shared `reqwest::Client` and issues GET requests
//! with a mandatory per-call timeout and an optional bounded retry policy.
//! It has no knowledge of payload formats: adapters receive a raw
//! [`Document`] and hand it to a format parser.

use std::borrow::Cow;
use std::time::Duration;

use log::warn;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::errors::{HoldingsError, RetryClass};

/// Browser User-Agent sent with every request; several issuer sites reject
/// the default reqwest agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A raw fetched payload: bytes plus the declared content type.
///
/// Content-type matters for sources that serve either Excel or CSV from the
/// same URL; the adapter picks its parser from it.
#[derive(Clone, Debug)]
pub struct Document {
    /// Value of the `Content-Type` response header, if present
    pub content_type: Option<String>,
    /// The response body
    pub bytes: Vec<u8>,
}

impl Document {
    /// Body as text, lossily replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Whether the declared content type marks an Excel workbook.
    pub fn is_excel(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("spreadsheetml") || ct.contains("excel"))
            .unwrap_or(false)
    }
}

/// Bounded retry with linearly increasing backoff.
///
/// Applied only to errors classified [`RetryClass::WithBackoff`]
/// (HTTP 429 and 5xx); other failures surface immediately.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Sleep before retry n is `n * backoff`
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// HTTP client shared by all adapters of a provider instance.
pub struct FetchClient {
    client: Client,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// Single GET attempt with a per-call timeout.
    pub async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Document, HoldingsError> {
        self.request(url, query, timeout).await
    }

    /// GET with bounded retry on transient failures.
    pub async fn get_with_retry(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Result<Document, HoldingsError> {
        let mut attempt: u32 = 0;
        loop {
            match self.request(url, query, timeout).await {
                Ok(document) => return Ok(document),
                Err(e)
                    if attempt < policy.max_retries
                        && e.retry_class() == RetryClass::WithBackoff =>
                {
                    attempt += 1;
                    let delay = policy.backoff * attempt;
                    warn!(
                        "Transient failure fetching {}: {}. Retrying in {:?} (attempt {}/{})",
                        url, e, delay, attempt, policy.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Document, HoldingsError> {
        let mut request = self.client.get(url).timeout(timeout);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                HoldingsError::Timeout {
                    url: url.to_string(),
                }
            } else {
                HoldingsError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HoldingsError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                HoldingsError::Timeout {
                    url: url.to_string(),
                }
            } else {
                HoldingsError::Network(e)
            }
        })?;

        Ok(Document {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_text_lossy() {
        let document = Document {
            content_type: Some("text/csv".to_string()),
            bytes: b"Ticker,Weight\nAAPL,6.71".to_vec(),
        };
        assert_eq!(document.text(), "Ticker,Weight\nAAPL,6.71");
    }

    #[test]
    fn test_document_is_excel() {
        let xlsx = Document {
            content_type: Some(
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            bytes: vec![],
        };
        assert!(xlsx.is_excel());

        let csv = Document {
            content_type: Some("text/csv; charset=utf-8".to_string()),
            bytes: vec![],
        };
        assert!(!csv.is_excel());

        let unknown = Document {
            content_type: None,
            bytes: vec![],
        };
        assert!(!unknown.is_excel());
    }

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.backoff, Duration::from_secs(1));
    }
}
