//! Validated runtime configuration.
//!
//! [`Cli`] holds what the user typed; [`RunConfig::resolve`] checks it and
//! produces the settings and work items the pipeline runs with. Any problem
//! surfaces here as [`Error::InvalidConfiguration`], before a browser is
//! started.

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::models::WorkItem;
use crate::workitems;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub max_pages: Option<usize>,
    pub headless: bool,
    pub domain: Url,
}

impl RunConfig {
    /// Validate the CLI and collect the work items to run, loading them from
    /// the work item file when one is given.
    #[instrument(level = "info", skip_all)]
    pub async fn resolve(cli: Cli) -> Result<(RunConfig, Vec<WorkItem>)> {
        let config = RunConfig::from_cli(&cli)?;

        let items = match &cli.work_items {
            Some(path) => workitems::load_work_items(path).await?,
            None => vec![workitems::validate(
                cli.query.as_deref(),
                Some(cli.order_by.as_str()),
                Some(i64::from(cli.months)),
            )?],
        };

        info!(
            items = items.len(),
            output_dir = %config.output_dir.display(),
            timeout_secs = config.timeout.as_secs(),
            max_pages = ?config.max_pages,
            headless = config.headless,
            domain = %config.domain,
            "Configuration resolved"
        );
        Ok((config, items))
    }

    /// Validate the settings that do not depend on work items.
    pub fn from_cli(cli: &Cli) -> Result<RunConfig> {
        if cli.timeout_secs == 0 {
            return Err(Error::invalid_config("timeout must be at least one second"));
        }
        if cli.max_pages == Some(0) {
            return Err(Error::invalid_config("max pages must be at least 1"));
        }
        let domain = Url::parse(&cli.domain).map_err(|e| {
            Error::invalid_config(format!("invalid domain '{}': {e}", cli.domain))
        })?;

        Ok(RunConfig {
            output_dir: cli.output_dir.clone(),
            timeout: Duration::from_secs(cli.timeout_secs),
            max_pages: cli.max_pages,
            headless: cli.headless,
            domain,
        })
    }
}
