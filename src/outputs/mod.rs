//! Output generation: spreadsheets, downloaded images and the run manifest.
//!
//! # Submodules
//!
//! - [`export`]: drives one export (images, then spreadsheet)
//! - [`images`]: downloads thumbnails to content-addressed files
//! - [`spreadsheet`]: writes the `.xlsx` workbook and its CSV copy
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── images/
//! │   └── <sha256(img_url)>.jpeg
//! ├── spreadsheets/
//! │   ├── 2024-01-15-09-30-05_oil-prices.xlsx
//! │   └── 2024-01-15-09-30-05_oil-prices.csv
//! ├── logs/
//! │   └── run.log
//! └── manifest.json
//! ```

pub mod export;
pub mod images;
pub mod spreadsheet;
