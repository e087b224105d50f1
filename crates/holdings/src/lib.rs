//! Etfolio Holdings Crate
//!
//! This crate retrieves fund-holdings disclosures published by ETF issuers
//! in heterogeneous formats and normalizes them into a canonical record
//! set, then aggregates per-ticker holdings into a portfolio-level view
//! with weight reconciliation.
//!
//! # Overview
//!
//! The crate supports:
//! - Eight issuer adapters behind one provider contract
//! - CSV, Excel, and nested-HTML document discovery
//! - Resilient fetching: per-call timeouts, bounded retry with backoff
//! - A once-per-process product index cache for the listing-based source
//! - Portfolio batches with partial-failure tolerance and 100% padding
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |     Caller       | --> | ProviderRegistry |  (key/alias -> adapter)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | HoldingsProvider |  (iShares, SSGA, ...)
//!                          +------------------+
//!                             |            |
//!                             v            v
//!                     +-------------+  +--------------+
//!                     | FetchClient |  | FormatParser |  (csv/xlsx/html)
//!                     +-------------+  +--------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |     Holding      |  (ticker, id, weight)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | PortfolioService |  (reconcile to 100%)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Holding`] - One constituent asset with its weight percentage
//! - [`HoldingsProvider`] - The contract every issuer adapter satisfies
//! - [`ProviderRegistry`] - Key/alias resolution to shared adapter instances
//! - [`PortfolioService`] - Batch retrieval with weight reconciliation
//! - [`HoldingsError`] - Typed failures: fetch, parse, config, registry

pub mod errors;
pub mod fetch;
pub mod models;
pub mod parse;
pub mod portfolio;
pub mod provider;
pub mod registry;

// Re-export model types
pub use models::{Holding, LineStatus, PortfolioLine, PortfolioRequest, PortfolioSummary};

// Re-export error types
pub use errors::{HoldingsError, RetryClass};

// Re-export fetch types
pub use fetch::{Document, FetchClient, RetryPolicy};

// Re-export parser types
pub use parse::{Cell, HeaderRule, ParsedTable};

// Re-export provider types
pub use provider::ark::ArkProvider;
pub use provider::firsttrust::FirstTrustProvider;
pub use provider::globalx::GlobalXProvider;
pub use provider::invesco::InvescoProvider;
pub use provider::ishares::ISharesProvider;
pub use provider::pacer::PacerProvider;
pub use provider::ssga::SsgaProvider;
pub use provider::vaneck::VanEckProvider;
pub use provider::HoldingsProvider;

// Re-export registry and portfolio types
pub use portfolio::{PortfolioService, DEFAULT_CONCURRENCY, FULL_WEIGHT, PADDING_HOLDING_ID, WEIGHT_EPSILON};
pub use registry::{ProviderRegistry, RegistryConfig};
