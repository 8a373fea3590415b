//! Error types shared by every stage of the search/export pipeline.
//!
//! Only hard failures travel through [`Error`]. Expected absences (no cookie
//! banner, no "show more" button, a card without an excerpt) are modelled as
//! `Option`/`bool` by the callers and never become errors.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected input: unknown sort order, missing query, unreadable work item.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// headless_chrome reports everything as `anyhow::Error`.
    #[error("Browser error: {0}")]
    Browser(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfiguration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = Error::invalid_config("unknown order_by 'oldest'");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: unknown order_by 'oldest'"
        );
    }

    #[test]
    fn test_io_error_converts() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?
        }
        assert!(matches!(fails(), Err(Error::Io(_))));
    }
}
