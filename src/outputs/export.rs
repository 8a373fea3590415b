//! Export of one search's result set: images first, then the spreadsheet.

use crate::error::Result;
use crate::models::ResultSet;
use crate::outputs::images::ImageDownloader;
use crate::outputs::spreadsheet::{self, SpreadsheetRow};
use crate::utils::slugify_title;
use chrono::{DateTime, Local};
use reqwest::Client;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument, warn};

pub const IMAGES_DIR: &str = "images";
pub const SPREADSHEETS_DIR: &str = "spreadsheets";

/// What an export wrote to disk.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// The `.xlsx` workbook.
    pub spreadsheet: PathBuf,
    /// CSV copy of the same table.
    pub csv: PathBuf,
    pub images: Vec<PathBuf>,
    pub rows: usize,
    /// Images whose download failed and were left out.
    pub skipped_images: usize,
}

#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    downloader: ImageDownloader,
}

impl Exporter {
    /// Image requests give up after `timeout`, like every other wait in a run.
    pub fn new(output_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(output_dir, client))
    }

    pub fn with_client(output_dir: impl Into<PathBuf>, client: Client) -> Self {
        let output_dir = output_dir.into();
        let downloader = ImageDownloader::new(client, output_dir.join(IMAGES_DIR));
        Self {
            output_dir,
            downloader,
        }
    }

    /// Download every image, then write the spreadsheet.
    ///
    /// A failed image download is logged and leaves that row's
    /// `picture_filename` empty; it does not abort the export.
    #[instrument(level = "info", skip_all, fields(%query, articles = results.len()))]
    pub async fn export(
        &self,
        query: &str,
        results: ResultSet,
        started_at: DateTime<Local>,
    ) -> Result<ExportReport> {
        let articles = results.into_sorted_vec();

        let mut images = Vec::new();
        let mut picture_filenames = Vec::with_capacity(articles.len());
        let mut skipped_images = 0usize;

        for article in &articles {
            let filename = match self.downloader.download(article).await {
                Ok(Some(path)) => {
                    let name = file_name(&path);
                    images.push(path);
                    name
                }
                Ok(None) => String::new(),
                Err(e) => {
                    skipped_images += 1;
                    warn!(
                        query = article.search_query(),
                        url = article.url(),
                        img_url = article.img_url().unwrap_or_default(),
                        error = %e,
                        "Image download failed; skipping image"
                    );
                    String::new()
                }
            };
            picture_filenames.push(filename);
        }

        let rows: Vec<SpreadsheetRow<'_>> = articles
            .iter()
            .zip(&picture_filenames)
            .map(|(article, filename)| SpreadsheetRow::new(article, filename))
            .collect();

        let spreadsheet = self.spreadsheet_path(query, started_at);
        let csv = spreadsheet.with_extension("csv");
        spreadsheet::write_workbook(&spreadsheet, &rows)?;
        spreadsheet::write_csv(&csv, &rows)?;

        info!(
            path = %spreadsheet.display(),
            rows = rows.len(),
            images = images.len(),
            skipped_images,
            "Export complete"
        );

        Ok(ExportReport {
            spreadsheet,
            csv,
            images,
            rows: rows.len(),
            skipped_images,
        })
    }

    /// `<output>/spreadsheets/<YYYY-MM-DD-HH-MM-SS>_<query-slug>.xlsx`
    pub fn spreadsheet_path(&self, query: &str, started_at: DateTime<Local>) -> PathBuf {
        let stamp = started_at.format("%Y-%m-%d-%H-%M-%S");
        let slug = slugify_title(query);
        let name = if slug.is_empty() {
            format!("{stamp}.xlsx")
        } else {
            format!("{stamp}_{slug}.xlsx")
        };
        self.output_dir.join(SPREADSHEETS_DIR).join(name)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
