//! Al Jazeera search scraper.
//!
//! Drives the search overlay on [Al Jazeera](https://www.aljazeera.com/),
//! switches the sort order, and keeps pressing "show more" while the results
//! are still inside the month window.
//!
//! # Result markup
//!
//! Results live in `.search-result__list`, one `article.gc` card each:
//!
//! ```text
//! article.gc.u-clickable-card
//! ├── h3.gc__title > a[href]            title + link
//! ├── div.gc__excerpt > p               excerpt
//! ├── img.article-card__image[src]      thumbnail (optional)
//! └── footer div.gc__date__date > div > span   "Last update 15 Jan 2024"
//! ```
//!
//! The results list is cumulative: after "show more" the earlier cards are
//! still there, so every extraction re-reads them and the result set drops
//! the duplicates.

use crate::browser::BrowserSession;
use crate::error::{Error, Result};
use crate::models::{Article, NO_CONTENT, NO_TITLE, OrderBy};
use crate::pagination::PageSource;
use crate::scrapers::element_text;
use crate::utils::truncate_for_log;
use anyhow::anyhow;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Landing page the search overlay is opened from.
pub const DOMAIN: &str = "https://www.aljazeera.com/";

const COOKIE_ACCEPT_CSS: &str = "#onetrust-accept-btn-handler";
const SEARCH_BUTTON_XPATH: &str = "//button/span[text()='Click here to search']/..";
const SEARCH_INPUT_XPATH: &str = "//input[@placeholder='Search']";
const SORT_SELECT_CSS: &str = "select#search-sort-option";
const RESULTS_LIST_CSS: &str = ".search-result__list";
const SHOW_MORE_CSS: &str = "button.show-more-button";
const LOADING_CSS: &str = "div.loading-animation";

/// Upper bound on how long to look for the cookie banner.
const COOKIE_BANNER_TIMEOUT: Duration = Duration::from_secs(10);

static CARD_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article.gc.u-clickable-card").unwrap());
static TITLE_LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("h3.gc__title a").unwrap());
static EXCERPT_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.gc__excerpt p").unwrap());
static DATE_SPAN_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("footer div.gc__date__date > div > span").unwrap());
static IMAGE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img.article-card__image").unwrap());

/// Trailing `15 Jan 2024`.
static CARD_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s+([A-Za-z]{3})[A-Za-z]*\s+(\d{4})\s*$").unwrap());

/// Turn the outer HTML of the results list into articles, in page order.
///
/// Missing titles and excerpts become [`NO_TITLE`]/[`NO_CONTENT`]; a card with
/// no link is skipped because the link is the article's identity.
pub fn extract_articles(html: &str, query: &str, base_url: &Url) -> Vec<Article> {
    let document = Html::parse_fragment(html);
    let mut articles = Vec::new();

    for card in document.select(&CARD_SEL) {
        match parse_card(card, query, base_url) {
            Some(article) => articles.push(article),
            None => warn!("Result card without a usable link; skipping"),
        }
    }

    debug!(count = articles.len(), "Extracted result cards");
    articles
}

fn parse_card(card: ElementRef<'_>, query: &str, base_url: &Url) -> Option<Article> {
    let title_link = card.select(&TITLE_LINK_SEL).next();

    let href = title_link.and_then(|a| a.value().attr("href"))?;
    let url = base_url.join(href.trim()).ok()?;

    let title = title_link
        .map(element_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let description = card
        .select(&EXCERPT_SEL)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_CONTENT.to_string());

    let date = card
        .select(&DATE_SPAN_SEL)
        .last()
        .and_then(|span| parse_card_date(&element_text(span)));

    let img_url = card
        .select(&IMAGE_SEL)
        .next()
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| base_url.join(src.trim()).ok())
        .map(String::from);

    Some(Article::new(
        query,
        title,
        description,
        url.as_str(),
        img_url,
        date,
    ))
}

/// Parse the date at the end of a card footer such as `Last update 5 Mar 2024`.
pub fn parse_card_date(text: &str) -> Option<NaiveDate> {
    let caps = CARD_DATE_RE.captures(text)?;
    let normalized = format!("{:0>2} {} {}", &caps[1], &caps[2], &caps[3]);
    NaiveDate::parse_from_str(&normalized, "%d %b %Y").ok()
}

/// [`PageSource`] backed by the Al Jazeera search UI.
pub struct AljazeeraSearch<'a> {
    session: &'a BrowserSession,
    base_url: Url,
    cookies_handled: bool,
}

impl<'a> AljazeeraSearch<'a> {
    pub fn new(session: &'a BrowserSession, base_url: Url) -> Self {
        Self {
            session,
            base_url,
            cookies_handled: false,
        }
    }

    /// Accept the cookie banner if it shows up. Only tried once per session:
    /// once accepted it does not come back.
    fn dismiss_cookie_banner(&mut self) {
        if self.cookies_handled {
            return;
        }
        self.cookies_handled = true;

        let timeout = self.session.timeout().min(COOKIE_BANNER_TIMEOUT);
        match self.session.wait_for_css_within(COOKIE_ACCEPT_CSS, timeout) {
            Some(button) => match button.click() {
                Ok(_) => info!("Accepted cookie banner"),
                Err(e) => debug!(error = %e, "Cookie banner not clickable; continuing"),
            },
            None => debug!("No cookie banner"),
        }
    }

    #[instrument(level = "info", skip(self))]
    fn submit_query(&self, query: &str) -> Result<()> {
        let button = self
            .session
            .wait_for_xpath(SEARCH_BUTTON_XPATH)
            .ok_or_else(|| missing("search button"))?;
        info!("Found search button");
        button.click()?;

        let input = self
            .session
            .wait_for_xpath(SEARCH_INPUT_XPATH)
            .ok_or_else(|| missing("search input"))?;
        info!("Found search input");

        input.click()?;
        self.session.run_script(&format!(
            "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue.value = '';",
            serde_json::to_string(SEARCH_INPUT_XPATH)?
        ))?;
        input.type_into(query)?;
        self.session.press_key("Enter")?;
        Ok(())
    }

    #[instrument(level = "info", skip(self))]
    fn select_order_by(&self, order_by: OrderBy) -> Result<()> {
        self.session
            .wait_for_css(SORT_SELECT_CSS)
            .ok_or_else(|| missing("sort selector"))?;

        self.session.run_script(&format!(
            "(() => {{ const s = document.querySelector({sel}); s.value = {val}; s.dispatchEvent(new Event('change', {{ bubbles: true }})); }})()",
            sel = serde_json::to_string(SORT_SELECT_CSS)?,
            val = serde_json::to_string(order_by.as_str())?,
        ))?;
        info!("Selected sort order");
        Ok(())
    }
}

impl PageSource for AljazeeraSearch<'_> {
    fn search(&mut self, query: &str, order_by: OrderBy) -> Result<()> {
        self.session.open_url(self.base_url.as_str())?;
        self.dismiss_cookie_banner();
        self.submit_query(query)?;
        self.select_order_by(order_by)
    }

    #[instrument(level = "info", skip(self))]
    fn extract_chunk(&mut self, query: &str) -> Result<Vec<Article>> {
        self.session.wait_until_gone(LOADING_CSS);

        let Some(list) = self.session.wait_for_css(RESULTS_LIST_CSS) else {
            info!("No results list on the page");
            return Ok(Vec::new());
        };
        let html = list.get_content()?;
        debug!(preview = %truncate_for_log(&html, 300), "Results list markup");
        let articles = extract_articles(&html, query, &self.base_url);
        info!(count = articles.len(), "Extracted results");
        Ok(articles)
    }

    fn request_more(&mut self) -> Result<bool> {
        let Some(button) = self.session.wait_for_css(SHOW_MORE_CSS) else {
            info!("No show-more button; last page reached");
            return Ok(false);
        };
        match button.click() {
            Ok(_) => {
                debug!("Clicked show more");
                Ok(true)
            }
            Err(e) => {
                info!(error = %e, "Show-more button not clickable; last page reached");
                Ok(false)
            }
        }
    }
}

fn missing(what: &str) -> Error {
    Error::Browser(anyhow!("{what} did not appear before the timeout"))
}
