//! Trailing month windows used to decide which search results are recent enough.
//!
//! A window is anchored on a reference date and reaches back a number of whole
//! calendar months: a size of 0 keeps only the reference month, a size of 2
//! keeps the reference month and the two before it.

use crate::models::Article;
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based, always in `1..=12`.
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month), "month out of range: {month}");
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The month immediately before this one.
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Months from `reference`'s month going back `window_size` months, newest first.
///
/// ```ignore
/// valid_months(date(2024, 1, 15), 2) == [2024-01, 2023-12, 2023-11]
/// ```
pub fn valid_months(reference: NaiveDate, window_size: u32) -> Vec<YearMonth> {
    std::iter::successors(Some(YearMonth::of(reference)), |ym| Some(ym.previous()))
        .take(window_size as usize + 1)
        .collect()
}

/// Keep the articles whose month is in `valid_months`, preserving order.
///
/// Duplicates are left alone; deduplication belongs to the result set.
pub fn filter_by_valid_months<'a, I>(articles: I, valid_months: &[YearMonth]) -> Vec<Article>
where
    I: IntoIterator<Item = &'a Article>,
{
    articles
        .into_iter()
        .filter(|article| valid_months.contains(&YearMonth::of(article.date())))
        .cloned()
        .collect()
}

/// The set of months considered valid for one search execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    months: Vec<YearMonth>,
}

impl MonthWindow {
    /// Anchor a window on `reference`. The caller passes the date explicitly
    /// so that "today" is taken when the search runs.
    pub fn ending_at(reference: NaiveDate, window_size: u32) -> Self {
        Self {
            months: valid_months(reference, window_size),
        }
    }

    /// The reference month.
    pub fn newest(&self) -> YearMonth {
        self.months[0]
    }

    /// The earliest month still inside the window.
    pub fn oldest(&self) -> YearMonth {
        self.months[self.months.len() - 1]
    }

    /// The months are contiguous, so membership is a range check.
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.oldest()..=self.newest()).contains(&YearMonth::of(date))
    }

    /// True when `date` falls in a month before the window's oldest month.
    pub fn is_older_than_window(&self, date: NaiveDate) -> bool {
        YearMonth::of(date) < self.oldest()
    }

    pub fn filter<'a, I>(&self, articles: I) -> Vec<Article>
    where
        I: IntoIterator<Item = &'a Article>,
    {
        filter_by_valid_months(articles, &self.months)
    }
}
