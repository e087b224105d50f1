//! Etfolio CLI: fetch ETF holdings and aggregate portfolio batches.
//!
//! Commands:
//! - `holdings`: fetch one fund's holdings, optionally only the top N
//! - `tickers`: list a provider's advertised ticker catalog
//! - `portfolio`: run a batch from a CSV file (`ETF Ticker,Provider Name`)
//!   and write the consolidated holdings as CSV

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use etfolio_holdings::{
    Holding, HoldingsProvider, LineStatus, PortfolioRequest, PortfolioService, ProviderRegistry,
    RegistryConfig,
};

#[derive(Parser)]
#[command(
    name = "etfolio",
    about = "ETF holdings retrieval and portfolio aggregation"
)]
struct Cli {
    /// TOML file overriding the VanEck ticker-to-slug map.
    #[arg(long, global = true)]
    vaneck_locations: Option<PathBuf>,

    /// TOML file overriding the ARK ticker-to-filename map.
    #[arg(long, global = true)]
    ark_locations: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch holdings for one fund.
    Holdings {
        /// Provider key or alias (e.g. ishares, "State Street").
        provider: String,

        /// The ETF ticker symbol.
        ticker: String,

        /// Historical as-of date (YYYY-MM-DD); honored by iShares only.
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Show only the N largest holdings.
        #[arg(long)]
        top: Option<usize>,
    },
    /// List a provider's advertised ticker catalog.
    Tickers {
        /// Provider key or alias.
        provider: String,
    },
    /// Run a portfolio batch from a CSV file.
    Portfolio {
        /// Input CSV with header "ETF Ticker,Provider Name".
        #[arg(long, default_value = "ETF-Portfolio.csv")]
        input: PathBuf,

        /// Output CSV for the consolidated holdings.
        #[arg(long, default_value = "holdings_output.csv")]
        output: PathBuf,

        /// Concurrent fetches.
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let registry = Arc::new(build_registry(&cli)?);

    match cli.command {
        Commands::Holdings {
            provider,
            ticker,
            as_of,
            top,
        } => {
            let adapter = registry.resolve(&provider)?;
            let holdings = match top {
                Some(n) => adapter.top_holdings(&ticker, n).await?,
                None => adapter.get_holdings(&ticker, as_of).await?,
            };

            println!(
                "\nHoldings for {} ({})",
                ticker.to_uppercase(),
                adapter.provider_name()
            );
            println!("{}", "=".repeat(40));
            for holding in &holdings {
                println!("{:<24} {:>8.2}%", holding.holding_id, holding.weight);
            }
            println!("\n{} holdings", holdings.len());
        }

        Commands::Tickers { provider } => {
            let adapter = registry.resolve(&provider)?;
            for ticker in adapter.supported_tickers().await? {
                println!("{}", ticker);
            }
        }

        Commands::Portfolio {
            input,
            output,
            concurrency,
        } => {
            let rows = read_portfolio_csv(&input)?;
            let service = PortfolioService::new(registry).with_concurrency(concurrency);
            let summary = service.get_portfolio(&rows).await;

            for line in &summary.lines {
                match &line.status {
                    LineStatus::Ok => {
                        let largest = line
                            .largest_holding()
                            .map(|h| format!("{} ({:.2}%)", h.holding_id, h.weight))
                            .unwrap_or_else(|| "-".to_string());
                        println!(
                            "{:<6} | Holdings: {:>4} | Total Weight: {:>6.2}% | Top 10 Weight: {:>6.2}% | Largest: {}",
                            line.etf_ticker,
                            line.holdings_count(),
                            line.total_weight,
                            line.top10_weight(),
                            largest
                        );
                    }
                    LineStatus::Failed(reason) => {
                        println!(
                            "Warning: failed to fetch {} via '{}': {}",
                            line.etf_ticker, line.provider_key, reason
                        );
                    }
                }
            }

            let holdings = summary.all_holdings();
            write_holdings_csv(&output, &holdings)?;
            println!(
                "\n{} holdings from {} funds written to {} ({} failed)",
                holdings.len(),
                summary.succeeded,
                output.display(),
                summary.failed
            );
        }
    }

    Ok(())
}

fn build_registry(cli: &Cli) -> Result<ProviderRegistry> {
    let config = RegistryConfig {
        vaneck_slugs: cli
            .vaneck_locations
            .as_deref()
            .map(load_location_map)
            .transpose()?,
        ark_filenames: cli
            .ark_locations
            .as_deref()
            .map(load_location_map)
            .transpose()?,
    };
    Ok(ProviderRegistry::with_config(config))
}

/// A location map file is flat TOML: `SMH = "semiconductor-etf-smh"`.
fn load_location_map(path: &Path) -> Result<HashMap<String, String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading location map {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing location map {}", path.display()))
}

fn read_portfolio_csv(path: &Path) -> Result<Vec<PortfolioRequest>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("reading portfolio file {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: PortfolioRequest =
            record.with_context(|| format!("parsing portfolio file {}", path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

fn write_holdings_csv(path: &Path, holdings: &[Holding]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("writing holdings file {}", path.display()))?;
    for holding in holdings {
        writer.serialize(holding)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_map_toml_shape() {
        let map: HashMap<String, String> =
            toml::from_str("SMH = \"semiconductor-etf-smh\"\nGDX = \"gold-miners-etf-gdx\"\n")
                .unwrap();
        assert_eq!(map["SMH"], "semiconductor-etf-smh");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_portfolio_csv_shape() {
        let mut reader =
            csv::Reader::from_reader("ETF Ticker,Provider Name\nIVV,iShares\nSPY,State Street\n".as_bytes());
        let rows: Vec<PortfolioRequest> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], PortfolioRequest::new("IVV", "iShares"));
        assert_eq!(rows[1].provider_key, "State Street");
    }
}
