//! Tabular export of the collected articles.
//!
//! One Excel workbook per search, plus a CSV copy of the same table. One row
//! per article, with the header row always written (also when nothing
//! matched).

use crate::error::Result;
use crate::models::Article;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument};

/// Name of the single worksheet in the workbook.
pub const SHEET_NAME: &str = "articles";

pub const COLUMNS: [&str; 7] = [
    "title",
    "description",
    "url",
    "picture_filename",
    "date",
    "total_query_occurrences",
    "has_money_string",
];

/// One output row; field order matches [`COLUMNS`].
#[derive(Debug, Serialize)]
pub struct SpreadsheetRow<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub url: &'a str,
    pub picture_filename: &'a str,
    pub date: String,
    pub total_query_occurrences: usize,
    pub has_money_string: bool,
}

impl<'a> SpreadsheetRow<'a> {
    /// `picture_filename` is empty when no image was saved for the article.
    pub fn new(article: &'a Article, picture_filename: &'a str) -> Self {
        Self {
            title: article.title(),
            description: article.description(),
            url: article.url(),
            picture_filename,
            date: article.date().format("%Y-%m-%d").to_string(),
            total_query_occurrences: article.query_occurrence_count(),
            has_money_string: article.has_monetary_value(),
        }
    }
}

/// Write the `.xlsx` workbook: bold header row, then one row per article.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = rows.len()))]
pub fn write_workbook(path: &Path, rows: &[SpreadsheetRow<'_>]) -> Result<()> {
    create_parent(path)?;

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in (0u16..).zip(COLUMNS) {
        sheet.write_string_with_format(0, col, name, &header)?;
    }
    for (row, record) in (1u32..).zip(rows) {
        sheet.write_string(row, 0, record.title)?;
        sheet.write_string(row, 1, record.description)?;
        sheet.write_string(row, 2, record.url)?;
        sheet.write_string(row, 3, record.picture_filename)?;
        sheet.write_string(row, 4, &record.date)?;
        sheet.write_number(row, 5, record.total_query_occurrences as f64)?;
        sheet.write_boolean(row, 6, record.has_money_string)?;
    }
    workbook.save(path)?;

    info!("Spreadsheet file created");
    Ok(())
}

/// Write the same table as CSV.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = rows.len()))]
pub fn write_csv(path: &Path, rows: &[SpreadsheetRow<'_>]) -> Result<()> {
    create_parent(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("CSV file created");
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tax_article() -> Article {
        Article::new(
            "tax",
            "Tax, again",
            "A $300 tax rebate",
            "https://example.com/tax",
            None,
            NaiveDate::from_ymd_opt(2024, 2, 3),
        )
    }

    fn zip_entry(path: &Path, name: &str) -> String {
        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        std::io::Read::read_to_string(&mut entry, &mut content).unwrap();
        content
    }

    #[test]
    fn test_write_workbook_holds_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheets").join("out.xlsx");
        let article = tax_article();
        let rows = vec![SpreadsheetRow::new(&article, "abc.jpeg")];

        write_workbook(&path, &rows).unwrap();

        let strings = zip_entry(&path, "xl/sharedStrings.xml");
        for column in COLUMNS {
            assert!(strings.contains(column), "missing header {column}");
        }
        assert!(strings.contains("Tax, again"));
        assert!(strings.contains("abc.jpeg"));
        assert!(strings.contains("2024-02-03"));

        let workbook = zip_entry(&path, "xl/workbook.xml");
        assert!(workbook.contains(SHEET_NAME));
    }

    #[test]
    fn test_write_csv_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheets").join("out.csv");
        let article = tax_article();
        let rows = vec![SpreadsheetRow::new(&article, "abc.jpeg")];

        write_csv(&path, &rows).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), COLUMNS.to_vec());

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "Tax, again");
        assert_eq!(&records[0][3], "abc.jpeg");
        assert_eq!(&records[0][4], "2024-02-03");
        assert_eq!(&records[0][5], "2");
        assert_eq!(&records[0][6], "true");
    }

    #[test]
    fn test_write_csv_empty_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_csv(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), COLUMNS.join(","));
    }
}
