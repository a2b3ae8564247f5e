//! SiteGuard CLI
//!
//! Drives the list registry and classifier from the command line: refresh
//! the cached lists, classify URLs, inspect cache state, or run the
//! scheduled refresh loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use sg_core::types::SiteStatus;
use sg_core::Classifier;
use sg_lists::registry::{
    default_sources, ListRegistry, RefreshOutcome, RefreshReport, DEFAULT_FETCH_TIMEOUT,
};
use sg_runtime::presenter::status_message;
use sg_runtime::settings::Settings;

mod store;

use store::JsonFileStore;

#[derive(Parser)]
#[command(name = "sg-cli")]
#[command(about = "SiteGuard list refresh and classification tools")]
struct Cli {
    /// Directory holding the cached lists and settings
    #[arg(long, default_value = ".siteguard", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all list sources and rebuild the cache
    Refresh {
        /// Fetch even if the schedule says a refresh is not due
        #[arg(short, long)]
        force: bool,
    },

    /// Classify a URL against the cached lists
    Classify {
        /// URL (or bare domain) to classify
        url: String,
    },

    /// Show cached list statistics
    Info,

    /// Run the scheduled refresh loop in the foreground
    Watch {
        /// Seconds between schedule checks
        #[arg(long, default_value_t = 3600)]
        tick_secs: u64,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Refresh { force } => cmd_refresh(&cli.data_dir, force).await,
        Commands::Classify { url } => cmd_classify(&cli.data_dir, &url).await,
        Commands::Info => cmd_info(&cli.data_dir),
        Commands::Watch { tick_secs } => cmd_watch(&cli.data_dir, tick_secs).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn open_registry(data_dir: &Path) -> Result<ListRegistry<Arc<JsonFileStore>>, String> {
    let store = Arc::new(
        JsonFileStore::open(data_dir.join("store.json"))
            .map_err(|e| format!("Failed to open store in '{}': {}", data_dir.display(), e))?,
    );
    let settings = Settings::load(store.as_ref());
    ListRegistry::new(
        store,
        default_sources(),
        settings.update_frequency,
        DEFAULT_FETCH_TIMEOUT,
    )
    .map_err(|e| format!("Failed to build registry: {e}"))
}

fn print_report(report: &RefreshReport) {
    match report.outcome {
        RefreshOutcome::NotDue => {
            println!("Refresh not due yet (use --force to fetch anyway)");
            return;
        }
        RefreshOutcome::Success => println!("Refreshed all lists"),
        RefreshOutcome::Partial => println!("Refreshed with failures (cached lists kept)"),
        RefreshOutcome::Failed => println!("Refresh failed for every source"),
    }
    for list in &report.lists {
        println!(
            "  {:<20} {:>7} candidates  {}",
            list.kind.as_str(),
            list.candidate_count,
            if list.fetched { "fetched" } else { "fetch failed" },
        );
    }
}

async fn cmd_refresh(data_dir: &Path, force: bool) -> Result<(), String> {
    let registry = open_registry(data_dir)?;
    registry.load_from_cache();
    let report = registry.refresh_all(force).await;
    print_report(&report);
    Ok(())
}

async fn cmd_classify(data_dir: &Path, url: &str) -> Result<(), String> {
    let registry = open_registry(data_dir)?;
    if !registry.load_from_cache() {
        log::info!("cache incomplete, fetching all sources");
        let report = registry.refresh_all(true).await;
        if report.outcome == RefreshOutcome::Failed {
            return Err("No cached lists and every source fetch failed".to_string());
        }
    }

    let classifier = Classifier::default();
    let snapshot = registry.snapshot();
    let result = classifier.classify(&snapshot, url);

    println!("Status:   {}", result.status.as_str());
    match &result.matched_url {
        Some(matched) => println!("Matched:  {matched}"),
        None => println!("Matched:  (none)"),
    }
    let display = result.matched_url.as_deref().unwrap_or(url);
    println!("{}", status_message(result.status, display));

    if result.status == SiteStatus::Unsafe {
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_info(data_dir: &Path) -> Result<(), String> {
    let registry = open_registry(data_dir)?;
    let complete = registry.load_from_cache();

    println!("Data dir:      {}", data_dir.display());
    println!("Cache:         {}", if complete { "complete" } else { "incomplete" });
    println!("Frequency:     {}", registry.frequency().as_str());
    match registry.last_refresh_at() {
        Some(at) => println!("Last refresh:  {at}"),
        None => println!("Last refresh:  never"),
    }
    println!();
    println!("Lists:");
    for stats in registry.stats() {
        let fetched = match stats.last_fetched_at {
            Some(at) => at.to_string(),
            None => "never".to_string(),
        };
        println!(
            "  {:<20} {:>7} candidates  {:<13} last fetched {}",
            stats.kind.as_str(),
            stats.candidate_count,
            stats.fetch_state.as_str(),
            fetched,
        );
    }
    Ok(())
}

async fn cmd_watch(data_dir: &Path, tick_secs: u64) -> Result<(), String> {
    let registry = open_registry(data_dir)?;
    if !registry.load_from_cache() {
        log::info!("cache incomplete, performing initial fetch");
        let report = registry.refresh_all(true).await;
        print_report(&report);
    }

    println!("Watching (checking schedule every {tick_secs}s, ctrl-c to stop)");
    let mut ticker = tokio::time::interval(Duration::from_secs(tick_secs));
    // The first tick fires immediately; the refresh above already covered it.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if let Some(report) = registry.maybe_refresh().await {
            print_report(&report);
        } else {
            log::debug!("tick: refresh not due");
        }
    }
}
