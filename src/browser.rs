//! Chrome session management.
//!
//! Wraps a `headless_chrome` browser and its single tab and adds the small
//! waiting helpers the search driver needs. Every wait is bounded by the
//! session timeout; an expired wait is reported as "absent" (`None`/`false`),
//! never as an error.

use crate::error::Result;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Chrome flags used for every session.
const CHROME_ARGS: [&str; 4] = [
    "--disable-extensions",
    "--disable-gpu",
    "--disable-web-security",
    "--start-maximized",
];

/// One Chrome process with one tab.
pub struct BrowserSession {
    // Keeps the Chrome process alive for as long as the tab is used.
    _browser: Browser,
    tab: Arc<Tab>,
    timeout: Duration,
}

impl BrowserSession {
    /// Launch Chrome and open a tab whose element waits default to `timeout`.
    #[instrument(level = "info")]
    pub fn launch(headless: bool, timeout: Duration) -> Result<Self> {
        let args: Vec<&OsStr> = CHROME_ARGS.iter().map(OsStr::new).collect();
        let browser = Browser::new(LaunchOptions {
            headless,
            sandbox: false,
            window_size: Some((1920, 1080)),
            idle_browser_timeout: timeout.max(Duration::from_secs(300)),
            args,
            ..Default::default()
        })?;

        let tab = browser.new_tab()?;
        tab.set_default_timeout(timeout);
        info!(headless, timeout_secs = timeout.as_secs(), "Browser launched");

        Ok(Self {
            _browser: browser,
            tab,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(level = "info", skip(self))]
    pub fn open_url(&self, url: &str) -> Result<()> {
        self.tab.navigate_to(url)?;
        self.tab.wait_until_navigated()?;
        info!("Page loaded");
        Ok(())
    }

    /// Wait up to the session timeout for a CSS selector.
    pub fn wait_for_css(&self, selector: &str) -> Option<Element<'_>> {
        self.wait_for_css_within(selector, self.timeout)
    }

    pub fn wait_for_css_within(&self, selector: &str, timeout: Duration) -> Option<Element<'_>> {
        match self.tab.wait_for_element_with_custom_timeout(selector, timeout) {
            Ok(element) => Some(element),
            Err(e) => {
                debug!(selector, error = %e, "Element not found before timeout");
                None
            }
        }
    }

    /// Wait up to the session timeout for an XPath expression.
    pub fn wait_for_xpath(&self, xpath: &str) -> Option<Element<'_>> {
        match self
            .tab
            .wait_for_xpath_with_custom_timeout(xpath, self.timeout)
        {
            Ok(element) => Some(element),
            Err(e) => {
                debug!(xpath, error = %e, "Element not found before timeout");
                None
            }
        }
    }

    /// Wait until nothing matches `selector`. Returns `false` if it was still
    /// present when the timeout expired.
    pub fn wait_until_gone(&self, selector: &str) -> bool {
        let deadline = Instant::now() + self.timeout;
        while self.tab.find_element(selector).is_ok() {
            if Instant::now() >= deadline {
                debug!(selector, "Element still present after timeout");
                return false;
            }
            sleep(POLL_INTERVAL);
        }
        true
    }

    /// Run a snippet of JavaScript in the page.
    pub fn run_script(&self, script: &str) -> Result<()> {
        self.tab.evaluate(script, false)?;
        Ok(())
    }

    pub fn press_key(&self, key: &str) -> Result<()> {
        self.tab.press_key(key)?;
        Ok(())
    }
}

