//! # News Search Export
//!
//! Drives a news outlet's search page in Chrome, keeps the results published
//! within a trailing window of months, and exports them to a spreadsheet
//! together with their thumbnails.
//!
//! ## Usage
//!
//! ```sh
//! news_search_export --query "oil prices" --order-by date --months 1
//! news_search_export --work-items items.yaml --output-dir ./output
//! ```
//!
//! ## Architecture
//!
//! Each work item goes through the same pipeline:
//! 1. **Searching**: open the site, accept cookies, submit the query, pick the sort order
//! 2. **Paginating**: read the results list, keep in-window articles, press
//!    "show more" until the oldest result leaves the window
//! 3. **Exporting**: download thumbnails, write the `.xlsx` spreadsheet and its CSV copy
//!
//! A `manifest.json` listing every artifact is written at the end.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{error, info, warn};

mod browser;
mod cli;
mod config;
mod error;
mod logging;
mod models;
mod outputs;
mod pagination;
mod scrapers;
mod search;
mod utils;
mod window;
mod workitems;

use browser::BrowserSession;
use cli::Cli;
use config::RunConfig;
use outputs::export::Exporter;
use scrapers::aljazeera::AljazeeraSearch;
use utils::ensure_writable_dir;
use workitems::{Manifest, write_manifest};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // Early check: the log file lives in the output dir too
    ensure_writable_dir(&args.output_dir).await?;
    let log_guard = logging::init(&args.output_dir)?;

    let start_time = std::time::Instant::now();
    let started_at = Local::now();
    info!(version = env!("CARGO_PKG_VERSION"), "news_search_export starting up");

    let (config, items) = match RunConfig::resolve(args).await {
        Ok(resolved) => resolved,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    let session = match BrowserSession::launch(config.headless, config.timeout) {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Failed to launch browser");
            return Err(e.into());
        }
    };

    let exporter = match Exporter::new(&config.output_dir, config.timeout) {
        Ok(exporter) => exporter,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return Err(e.into());
        }
    };
    let mut source = AljazeeraSearch::new(&session, config.domain.clone());
    let mut manifest = Manifest::new(started_at, Some(log_guard.path.clone()));

    let total = items.len();
    for (index, item) in items.into_iter().enumerate() {
        info!(index, total, query = %item.query, "Processing work item");
        let entry =
            search::process_item(&mut source, &exporter, item, config.max_pages, started_at).await;
        manifest.items.push(entry);
    }

    if let Err(e) = write_manifest(&manifest, &config.output_dir).await {
        error!(error = %e, "Failed to write manifest");
    }

    let failed = manifest.failures();
    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        items = total,
        failed,
        "Execution complete"
    );

    if failed > 0 {
        warn!(failed, total, "Some work items failed");
        return Err(format!("{failed} of {total} work items failed").into());
    }
    Ok(())
}
