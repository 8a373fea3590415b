//! Result pagination as an explicit state machine.
//!
//! The browser work (typing the query, reading the results list, clicking
//! "show more") sits behind [`PageSource`]. Deciding whether another page is
//! worth loading is the pure function [`next_state`], so the stop policy can be
//! tested without a browser.
//!
//! ```text
//! Searching ──► ExtractingPage ──► RequestingMore ──► ExtractingPage ──► ...
//!                     │                  │
//!                     ▼                  ▼
//!                   Done               Done
//! ```

use crate::error::Result;
use crate::models::{Article, OrderBy, ResultSet, WorkItem};
use crate::window::MonthWindow;
use tracing::{debug, info, instrument};

/// The impure side of pagination: something that can run a search and hand
/// back one page of results at a time.
pub trait PageSource {
    /// Submit `query` and apply the sort order.
    fn search(&mut self, query: &str, order_by: OrderBy) -> Result<()>;

    /// Read the results currently shown. Newest first when sorted by date.
    fn extract_chunk(&mut self, query: &str) -> Result<Vec<Article>>;

    /// Load the next page. `Ok(false)` means there is none (no button, not
    /// clickable, or it never appeared within the timeout).
    fn request_more(&mut self) -> Result<bool>;
}

/// Why the pagination loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The page held no results at all.
    EmptyChunk,
    /// The last result on the page is older than the window.
    OutsideWindow,
    /// The source had no further page to load.
    NoMorePages,
    /// The configured page limit was reached.
    PageLimit,
    /// "Show more" was accepted but the page ended on the same card as before.
    NoProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Searching,
    ExtractingPage,
    RequestingMore,
    Done(StopReason),
}

/// Decide what follows a freshly extracted chunk.
///
/// Looks only at the chunk's last (oldest) entry: as long as it is not older
/// than the window's oldest month, the next page may still hold matches.
pub fn next_state(chunk: &[Article], window: &MonthWindow) -> PaginationState {
    match chunk.last() {
        None => PaginationState::Done(StopReason::EmptyChunk),
        Some(last) if window.is_older_than_window(last.date()) => {
            PaginationState::Done(StopReason::OutsideWindow)
        }
        Some(_) => PaginationState::RequestingMore,
    }
}

/// What a finished pagination run produced.
#[derive(Debug)]
pub struct PaginationOutcome {
    pub results: ResultSet,
    pub pages: usize,
    pub stop_reason: StopReason,
}

/// Drives a [`PageSource`] through the pagination states for one work item.
#[derive(Debug, Clone)]
pub struct Paginator {
    window: MonthWindow,
    max_pages: Option<usize>,
}

impl Paginator {
    pub fn new(window: MonthWindow) -> Self {
        Self {
            window,
            max_pages: None,
        }
    }

    /// Stop after `max_pages` extracted pages even if the window is not exhausted.
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    #[instrument(level = "info", skip_all, fields(query = %item.query, order_by = %item.order_by))]
    pub fn run<S: PageSource>(&self, source: &mut S, item: &WorkItem) -> Result<PaginationOutcome> {
        let mut results = ResultSet::new();
        let mut pages = 0usize;
        let mut state = PaginationState::Searching;
        let mut last_seen: Option<String> = None;

        let stop_reason = loop {
            debug!(?state, pages, "Pagination step");
            state = match state {
                PaginationState::Searching => {
                    source.search(&item.query, item.order_by)?;
                    PaginationState::ExtractingPage
                }
                PaginationState::ExtractingPage => {
                    let chunk = source.extract_chunk(&item.query)?;
                    pages += 1;

                    let kept = self.window.filter(&chunk);
                    let kept_count = kept.len();
                    let added = results.merge(kept);
                    info!(
                        page = pages,
                        extracted = chunk.len(),
                        in_window = kept_count,
                        added,
                        total = results.len(),
                        "Processed result page"
                    );

                    let last = chunk.last().map(|a| a.identity_hash().to_string());
                    let stalled = pages > 1 && last.is_some() && last == last_seen;
                    last_seen = last;

                    match next_state(&chunk, &self.window) {
                        PaginationState::RequestingMore if stalled => {
                            PaginationState::Done(StopReason::NoProgress)
                        }
                        PaginationState::RequestingMore
                            if self.max_pages.is_some_and(|max| pages >= max) =>
                        {
                            PaginationState::Done(StopReason::PageLimit)
                        }
                        next => next,
                    }
                }
                PaginationState::RequestingMore => {
                    if source.request_more()? {
                        PaginationState::ExtractingPage
                    } else {
                        PaginationState::Done(StopReason::NoMorePages)
                    }
                }
                PaginationState::Done(reason) => break reason,
            };
        };

        info!(pages, total = results.len(), ?stop_reason, "Pagination finished");
        Ok(PaginationOutcome {
            results,
            pages,
            stop_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::VecDeque;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn article(url: &str, d: NaiveDate) -> Article {
        Article::new("q", "title", "description", url, None, Some(d))
    }

    fn item() -> WorkItem {
        WorkItem {
            query: "q".to_string(),
            order_by: OrderBy::Date,
            months: 0,
        }
    }

    /// Serves canned pages. The page list is cumulative like the real
    /// results list, which keeps earlier cards after "show more".
    #[derive(Default)]
    struct FakeSource {
        pages: VecDeque<Vec<Article>>,
        current: Vec<Article>,
        searches: Vec<(String, OrderBy)>,
        more_requests: usize,
    }

    impl FakeSource {
        fn with_pages(pages: Vec<Vec<Article>>) -> Self {
            Self {
                pages: pages.into(),
                ..Default::default()
            }
        }
    }

    impl PageSource for FakeSource {
        fn search(&mut self, query: &str, order_by: OrderBy) -> Result<()> {
            self.searches.push((query.to_string(), order_by));
            self.current = self.pages.pop_front().unwrap_or_default();
            Ok(())
        }

        fn extract_chunk(&mut self, _query: &str) -> Result<Vec<Article>> {
            Ok(self.current.clone())
        }

        fn request_more(&mut self) -> Result<bool> {
            self.more_requests += 1;
            match self.pages.pop_front() {
                Some(page) => {
                    self.current.extend(page);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[test]
    fn test_next_state_empty_chunk_is_done() {
        let window = MonthWindow::ending_at(date(2024, 1, 15), 0);
        assert_eq!(
            next_state(&[], &window),
            PaginationState::Done(StopReason::EmptyChunk)
        );
    }

    #[test]
    fn test_next_state_requests_more_while_inside_window() {
        let window = MonthWindow::ending_at(date(2024, 1, 15), 2);
        let chunk = vec![
            article("https://example.com/1", date(2024, 1, 10)),
            article("https://example.com/2", date(2023, 11, 2)),
        ];
        assert_eq!(next_state(&chunk, &window), PaginationState::RequestingMore);
    }

    #[test]
    fn test_next_state_compares_year_and_month_together() {
        // Oldest month is 2023-11; a January 2024 entry is newer even though
        // its month number is smaller.
        let window = MonthWindow::ending_at(date(2024, 1, 15), 2);
        let chunk = vec![article("https://example.com/1", date(2024, 1, 2))];
        assert_eq!(next_state(&chunk, &window), PaginationState::RequestingMore);
    }

    #[test]
    fn test_next_state_stops_past_window() {
        let window = MonthWindow::ending_at(date(2024, 1, 15), 0);
        let chunk = vec![
            article("https://example.com/1", date(2024, 1, 10)),
            article("https://example.com/2", date(2023, 12, 30)),
        ];
        assert_eq!(
            next_state(&chunk, &window),
            PaginationState::Done(StopReason::OutsideWindow)
        );
    }

    #[test]
    fn test_run_stops_when_results_leave_window() {
        let window = MonthWindow::ending_at(date(2024, 1, 15), 0);
        let mut source = FakeSource::with_pages(vec![
            vec![
                article("https://example.com/1", date(2024, 1, 14)),
                article("https://example.com/2", date(2024, 1, 10)),
            ],
            vec![
                article("https://example.com/3", date(2024, 1, 2)),
                article("https://example.com/4", date(2023, 12, 28)),
            ],
            vec![article("https://example.com/5", date(2023, 12, 1))],
        ]);

        let outcome = Paginator::new(window).run(&mut source, &item()).unwrap();

        assert_eq!(outcome.stop_reason, StopReason::OutsideWindow);
        assert_eq!(outcome.pages, 2);
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(source.more_requests, 1);
        assert_eq!(source.searches, vec![("q".to_string(), OrderBy::Date)]);
    }

    #[test]
    fn test_run_stops_when_no_more_pages() {
        let window = MonthWindow::ending_at(date(2024, 1, 15), 0);
        let mut source = FakeSource::with_pages(vec![vec![
            article("https://example.com/1", date(2024, 1, 14)),
        ]]);

        let outcome = Paginator::new(window).run(&mut source, &item()).unwrap();

        assert_eq!(outcome.stop_reason, StopReason::NoMorePages);
        assert_eq!(outcome.pages, 1);
        assert_eq!(outcome.results.len(), 1);
    }

    #[test]
    fn test_run_handles_empty_first_page() {
        let window = MonthWindow::ending_at(date(2024, 1, 15), 0);
        let mut source = FakeSource::default();

        let outcome = Paginator::new(window).run(&mut source, &item()).unwrap();

        assert_eq!(outcome.stop_reason, StopReason::EmptyChunk);
        assert!(outcome.results.is_empty());
        assert_eq!(source.more_requests, 0);
    }

    #[test]
    fn test_run_respects_page_limit() {
        let window = MonthWindow::ending_at(date(2024, 1, 15), 0);
        let mut source = FakeSource::with_pages(vec![
            vec![article("https://example.com/1", date(2024, 1, 14))],
            vec![article("https://example.com/2", date(2024, 1, 13))],
            vec![article("https://example.com/3", date(2024, 1, 12))],
        ]);

        let outcome = Paginator::new(window)
            .with_max_pages(Some(2))
            .run(&mut source, &item())
            .unwrap();

        assert_eq!(outcome.stop_reason, StopReason::PageLimit);
        assert_eq!(outcome.pages, 2);
        assert_eq!(outcome.results.len(), 2);
    }

    /// Claims there is always another page but keeps showing the same list.
    struct StuckSource {
        chunk: Vec<Article>,
        more_requests: usize,
    }

    impl PageSource for StuckSource {
        fn search(&mut self, _query: &str, _order_by: OrderBy) -> Result<()> {
            Ok(())
        }

        fn extract_chunk(&mut self, _query: &str) -> Result<Vec<Article>> {
            Ok(self.chunk.clone())
        }

        fn request_more(&mut self) -> Result<bool> {
            self.more_requests += 1;
            Ok(true)
        }
    }

    #[test]
    fn test_run_stops_when_show_more_adds_nothing() {
        let window = MonthWindow::ending_at(date(2024, 1, 15), 0);
        let mut source = StuckSource {
            chunk: vec![article("https://example.com/1", date(2024, 1, 14))],
            more_requests: 0,
        };

        let outcome = Paginator::new(window).run(&mut source, &item()).unwrap();

        assert_eq!(outcome.stop_reason, StopReason::NoProgress);
        assert_eq!(outcome.pages, 2);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(source.more_requests, 1);
    }

    #[test]
    fn test_run_deduplicates_repeated_cards() {
        let window = MonthWindow::ending_at(date(2024, 1, 15), 0);
        // Cumulative list: the first card shows up on every extraction.
        let mut source = FakeSource::with_pages(vec![
            vec![article("https://example.com/1", date(2024, 1, 14))],
            vec![article("https://example.com/2", date(2024, 1, 13))],
        ]);

        let outcome = Paginator::new(window).run(&mut source, &item()).unwrap();

        assert_eq!(outcome.pages, 2);
        assert_eq!(outcome.results.len(), 2);
    }
}
