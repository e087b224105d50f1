//! Data models shared across the holdings crate.

mod holding;
mod portfolio;

pub use holding::Holding;
pub use portfolio::{LineStatus, PortfolioLine, PortfolioRequest, PortfolioSummary};
