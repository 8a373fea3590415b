//! One search/export cycle per work item.
//!
//! Ties the pieces together: anchor a month window on today's date, paginate
//! a [`PageSource`] until the window is exhausted, then export what was kept.

use crate::error::Result;
use crate::models::WorkItem;
use crate::outputs::export::Exporter;
use crate::pagination::{PageSource, PaginationOutcome, Paginator};
use crate::window::MonthWindow;
use crate::workitems::ManifestEntry;
use chrono::{DateTime, Local, NaiveDate};
use tracing::{error, info, instrument};

/// Paginate `source` for `item` with a window ending at `today`.
pub fn collect<S: PageSource>(
    source: &mut S,
    item: &WorkItem,
    today: NaiveDate,
    max_pages: Option<usize>,
) -> Result<PaginationOutcome> {
    let window = MonthWindow::ending_at(today, item.months);
    info!(
        newest = %window.newest(),
        oldest = %window.oldest(),
        "Month window"
    );
    Paginator::new(window)
        .with_max_pages(max_pages)
        .run(source, item)
}

/// Run one work item end to end. Failures are logged and recorded in the
/// returned entry rather than aborting the remaining items.
#[instrument(level = "info", skip_all, fields(query = %item.query, order_by = %item.order_by, months = item.months))]
pub async fn process_item<S: PageSource>(
    source: &mut S,
    exporter: &Exporter,
    item: WorkItem,
    max_pages: Option<usize>,
    started_at: DateTime<Local>,
) -> ManifestEntry {
    // Reference date is read per item, never cached at startup.
    let today = Local::now().date_naive();

    let outcome = match collect(source, &item, today, max_pages) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Search failed");
            return ManifestEntry::failed(item, 0, None, &e);
        }
    };

    let pages = outcome.pages;
    let stop_reason = outcome.stop_reason;
    match exporter.export(&item.query, outcome.results, started_at).await {
        Ok(report) => {
            info!(rows = report.rows, pages, ?stop_reason, "Work item done");
            ManifestEntry::succeeded(item, pages, stop_reason, report)
        }
        Err(e) => {
            error!(error = %e, pages, ?stop_reason, "Export failed");
            ManifestEntry::failed(item, pages, Some(stop_reason), &e)
        }
    }
}
