//! Sports odds arbitrage scanner entry point.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use book_scout::catalog::{parse_catalog, Event, ParsedCatalog};
use book_scout::config::Config;
use book_scout::feed::{load_snapshot, OddsApiClient};
use book_scout::metrics;
use book_scout::odds::available_bookmakers;
use book_scout::report::{render_json, render_text};
use book_scout::scanner::{ScanSettings, Scanner};
use book_scout::selection::{choose_by_indexes, load_allow_list, AllowList};

/// Cross-bookmaker sports odds arbitrage scanner.
#[derive(Parser, Debug)]
#[command(name = "book-scout")]
#[command(about = "Find arbitrage opportunities across sportsbook odds")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the odds feed for arbitrage opportunities (default).
    Scan(ScanArgs),

    /// List bookmakers quoted in the feed.
    Bookmakers {
        /// Read odds from a saved JSON snapshot instead of the API.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[derive(ClapArgs, Debug, Default)]
struct ScanArgs {
    /// Read odds from a saved JSON snapshot instead of the API.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Allowed bookmakers, comma-separated.
    #[arg(long, value_delimiter = ',')]
    bookmakers: Vec<String>,

    /// File with one bookmaker key per line.
    #[arg(long)]
    bookmakers_file: Option<PathBuf>,

    /// Pick bookmakers interactively from those in the feed.
    #[arg(short, long)]
    interactive: bool,

    /// Budget to split across each opportunity (overrides TOTAL_STAKE).
    #[arg(long)]
    stake: Option<Decimal>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (stderr, so reports on stdout stay clean)
    let filter = if args.verbose {
        EnvFilter::new("book_scout=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // Initialize metrics
    metrics::init_metrics();

    // Handle subcommands
    match args.command {
        Some(Command::Scan(scan)) => cmd_scan(&config, scan).await,
        Some(Command::Bookmakers { snapshot }) => cmd_bookmakers(&config, snapshot.as_deref()).await,
        Some(Command::CheckConfig) => cmd_check_config(&config),
        None => cmd_scan(&config, ScanArgs::default()).await,
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("BOOK SCOUT - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Odds API: {}", config.odds_api_url);
    println!(
        "  API Key: {}",
        if config.odds_api_key.is_some() { "present" } else { "MISSING (use --snapshot)" }
    );
    println!("  Sport: {}", config.sport_key);
    println!("  Regions: {}", config.regions);
    println!("  Markets: {}", config.markets);
    match config.configured_allow_list() {
        Some(list) => println!(
            "  Bookmakers: {}",
            list.iter().collect::<Vec<_>>().join(", ")
        ),
        None => println!("  Bookmakers: all in feed"),
    }
    println!("  Stake: ${}", config.total_stake);
    println!("  Max Total Inverse Price: {}", config.max_total_inverse);
    println!("  Display Offset: {}", config.display_offset());
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// List the bookmakers quoted in the feed.
async fn cmd_bookmakers(config: &Config, snapshot: Option<&Path>) -> anyhow::Result<()> {
    let catalog = load_catalog(config, snapshot).await?;

    let available = available_bookmakers(&catalog.events);
    if available.is_empty() {
        println!("No bookmakers quoted in {} events.", catalog.events.len());
        return Ok(());
    }

    for (idx, bookmaker) in available.iter().enumerate() {
        println!("{}. {}", idx + 1, bookmaker);
    }

    Ok(())
}

/// Scan the feed and print ranked opportunities.
async fn cmd_scan(config: &Config, scan: ScanArgs) -> anyhow::Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    let catalog = load_catalog(config, scan.snapshot.as_deref()).await?;
    let allow_list = select_allow_list(config, &scan, &catalog.events)?;
    info!(
        bookmakers = %allow_list.iter().collect::<Vec<_>>().join(","),
        "Using bookmakers"
    );

    let mut settings = ScanSettings::from_config(config, allow_list);
    if let Some(stake) = scan.stake {
        settings.stake = stake;
    }

    let scanner = Scanner::new(settings)?;
    info!(
        stake = %scanner.settings().stake,
        max_total_inverse = %scanner.settings().max_total_inverse,
        "Scanning"
    );
    let report = scanner.scan(&catalog.events)?;

    if scan.json {
        println!("{}", render_json(&report)?);
    } else {
        print!(
            "{}",
            render_text(&report, config.display_offset(), OffsetDateTime::now_utc())
        );
    }

    Ok(())
}

/// Fetch (or read) and decode the catalog, reporting skipped records.
async fn load_catalog(config: &Config, snapshot: Option<&Path>) -> book_scout::Result<ParsedCatalog> {
    let body = match snapshot {
        Some(path) => load_snapshot(path).await?,
        None => OddsApiClient::new(config)?.fetch_odds().await?,
    };

    let catalog = parse_catalog(&body)?;
    if !catalog.diagnostics.is_empty() {
        warn!(
            rejected = catalog.diagnostics.len(),
            "Some catalog records were malformed and skipped"
        );
    }
    info!(events = catalog.events.len(), "Catalog loaded");

    Ok(catalog)
}

/// Resolve the allow-list: interactive, then CLI flags, then config, then
/// every bookmaker in the feed.
fn select_allow_list(config: &Config, scan: &ScanArgs, events: &[Event]) -> anyhow::Result<AllowList> {
    if scan.interactive {
        return Ok(prompt_allow_list(&available_bookmakers(events))?);
    }

    if !scan.bookmakers.is_empty() {
        return Ok(scan.bookmakers.iter().map(String::as_str).collect());
    }

    if let Some(path) = &scan.bookmakers_file {
        return Ok(load_allow_list(path));
    }

    Ok(config
        .configured_allow_list()
        .unwrap_or_else(|| available_bookmakers(events).into_iter().collect()))
}

/// Ask the user to pick bookmakers by number.
fn prompt_allow_list(available: &[String]) -> book_scout::Result<AllowList> {
    println!("Available bookmakers:");
    for (idx, bookmaker) in available.iter().enumerate() {
        println!("{}. {}", idx + 1, bookmaker);
    }
    print!("Enter the numbers of the bookmakers you want to use (comma-separated): ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    match choose_by_indexes(available, &line) {
        Ok(list) => Ok(list),
        Err(e) => {
            println!("Invalid choice ({}), defaulting to available bookmakers.", e);
            Ok(available.iter().map(String::as_str).collect())
        }
    }
}
