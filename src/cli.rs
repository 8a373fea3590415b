//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option can also be supplied through an environment variable, which
//! is how the bot is configured when it runs unattended.

use crate::scrapers::aljazeera;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one run of the bot.
///
/// # Examples
///
/// ```sh
/// # One search, current month only
/// news_search_export --query "oil prices"
///
/// # Sorted by relevance, current month and the two before it
/// news_search_export -q "oil prices" --order-by relevance --months 2
///
/// # Several searches from a work item file
/// news_search_export --work-items items.yaml --output-dir ./output
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search query (ignored when --work-items is given)
    #[arg(short, long, env = "NEWS_QUERY")]
    pub query: Option<String>,

    /// Sort order of the results: "date" or "relevance"
    #[arg(short = 'b', long, env = "NEWS_ORDER_BY", default_value = "date")]
    pub order_by: String,

    /// Months before the current one to keep; 0 keeps the current month only
    #[arg(short, long, env = "NEWS_MONTHS", default_value_t = 0)]
    pub months: u32,

    /// JSON or YAML file with one or more work items
    #[arg(short, long, env = "NEWS_WORK_ITEMS")]
    pub work_items: Option<PathBuf>,

    /// Directory for spreadsheets, images, logs and the manifest
    #[arg(short, long, env = "NEWS_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Seconds to wait for any page element before treating it as absent
    #[arg(long, env = "NEWS_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Stop after this many result pages per search
    #[arg(long, env = "NEWS_MAX_PAGES")]
    pub max_pages: Option<usize>,

    /// Run Chrome without a window
    #[arg(long, env = "NEWS_HEADLESS")]
    pub headless: bool,

    /// Site to search
    #[arg(long, env = "NEWS_DOMAIN", default_value = aljazeera::DOMAIN)]
    pub domain: String,
}
