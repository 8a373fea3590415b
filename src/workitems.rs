//! Work item intake and the output manifest.
//!
//! Input files hold one search request or a list of them, as JSON or YAML.
//! Each entry is either a bare payload or wrapped in `{"payload": ...}`:
//!
//! ```yaml
//! - query: oil prices
//!   order_by: date
//!   months: 2
//! - payload:
//!     query: elections
//! ```
//!
//! Every entry is validated here, so the rest of the pipeline only ever sees
//! a well-formed [`WorkItem`].

use crate::error::{Error, Result};
use crate::models::{OrderBy, WorkItem};
use crate::outputs::export::ExportReport;
use crate::pagination::StopReason;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Longest trailing window a work item may ask for (one hundred years).
pub const MAX_MONTHS: u32 = 1200;

#[derive(Debug, Deserialize)]
struct RawWorkItem {
    query: Option<String>,
    order_by: Option<String>,
    months: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Wrapped { payload: RawWorkItem },
    Bare(RawWorkItem),
}

impl RawEntry {
    fn into_inner(self) -> RawWorkItem {
        match self {
            RawEntry::Wrapped { payload } => payload,
            RawEntry::Bare(item) => item,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawItems {
    Many(Vec<RawEntry>),
    One(RawEntry),
}

/// Validate one search request.
pub fn validate(query: Option<&str>, order_by: Option<&str>, months: Option<i64>) -> Result<WorkItem> {
    let query = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| Error::invalid_config("work item has no query"))?
        .to_string();

    let order_by = match order_by {
        Some(value) => value.parse::<OrderBy>()?,
        None => OrderBy::default(),
    };

    let requested = months.unwrap_or(0);
    let months = u32::try_from(requested)
        .ok()
        .filter(|m| *m <= MAX_MONTHS)
        .ok_or_else(|| {
            Error::invalid_config(format!(
                "months must be an integer between 0 and {MAX_MONTHS}, got {requested}"
            ))
        })?;

    Ok(WorkItem {
        query,
        order_by,
        months,
    })
}

/// Parse work items from file contents, choosing the format by extension.
pub fn parse_work_items(content: &str, path: &Path) -> Result<Vec<WorkItem>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let raw: RawItems = match extension.as_deref() {
        Some("json") => serde_json::from_str(content)?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(content)?,
        _ => {
            return Err(Error::invalid_config(format!(
                "unsupported work item file '{}', expected .json, .yaml or .yml",
                path.display()
            )));
        }
    };

    let entries = match raw {
        RawItems::Many(entries) => entries,
        RawItems::One(entry) => vec![entry],
    };
    if entries.is_empty() {
        return Err(Error::invalid_config(format!(
            "no work items in '{}'",
            path.display()
        )));
    }

    entries
        .into_iter()
        .map(RawEntry::into_inner)
        .map(|raw| validate(raw.query.as_deref(), raw.order_by.as_deref(), raw.months))
        .collect()
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_work_items(path: &Path) -> Result<Vec<WorkItem>> {
    let content = fs::read_to_string(path).await?;
    let items = parse_work_items(&content, path)?;
    info!(count = items.len(), "Loaded work items");
    Ok(items)
}

/// Outcome of one work item, as recorded in the manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub item: WorkItem,
    pub pages: usize,
    pub stop_reason: Option<String>,
    pub export: Option<ExportReport>,
    pub error: Option<String>,
}

impl ManifestEntry {
    pub fn succeeded(item: WorkItem, pages: usize, stop_reason: StopReason, export: ExportReport) -> Self {
        Self {
            item,
            pages,
            stop_reason: Some(format!("{stop_reason:?}")),
            export: Some(export),
            error: None,
        }
    }

    /// `pages` and `stop_reason` describe how far pagination got before the
    /// failure; zero and `None` when the search itself failed.
    pub fn failed(
        item: WorkItem,
        pages: usize,
        stop_reason: Option<StopReason>,
        error: &Error,
    ) -> Self {
        Self {
            item,
            pages,
            stop_reason: stop_reason.map(|reason| format!("{reason:?}")),
            export: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything a run produced: one entry per work item plus the log file.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub started_at: String,
    pub log_file: Option<PathBuf>,
    pub items: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(started_at: DateTime<Local>, log_file: Option<PathBuf>) -> Self {
        Self {
            started_at: started_at.to_rfc3339(),
            log_file,
            items: Vec::new(),
        }
    }

    pub fn failures(&self) -> usize {
        self.items.iter().filter(|entry| !entry.is_success()).count()
    }
}

/// Write the manifest as `<output_dir>/manifest.json`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_manifest(manifest: &Manifest, output_dir: &Path) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(manifest)?;
    fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(MANIFEST_FILE);
    fs::write(&path, json).await?;
    info!(path = %path.display(), items = manifest.items.len(), "Wrote manifest");
    Ok(path)
}
