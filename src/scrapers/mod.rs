//! News outlet search scrapers.
//!
//! Each outlet module has two halves:
//!
//! 1. **Extraction**: a pure function turning the markup of a results list
//!    into [`Article`](crate::models::Article)s, testable on fixture HTML
//! 2. **Driving**: a [`PageSource`](crate::pagination::PageSource) that runs
//!    the outlet's search UI in a [`BrowserSession`](crate::browser::BrowserSession)
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Al Jazeera | [`aljazeera`] | Browser-driven search | Sort by date or relevance, "show more" pagination |

pub mod aljazeera;

use itertools::Itertools;
use scraper::ElementRef;

/// Text content of an element with runs of whitespace collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_element_text_collapses_whitespace() {
        let html = Html::parse_fragment("<p>\n  Hello <b>big</b>\n\n world  </p>");
        let selector = Selector::parse("p").unwrap();
        let p = html.select(&selector).next().unwrap();
        assert_eq!(element_text(p), "Hello big world");
    }
}
