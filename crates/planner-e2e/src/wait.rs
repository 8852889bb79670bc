//! Wait and Interaction Layer
//!
//! Bounded poll-until-condition-or-timeout primitives used by every screen
//! object. Each call re-resolves its [`Locator`] against the current page;
//! nothing is cached between calls.
//!
//! Two families exist side by side:
//!
//! - **Required** lookups ([`BasePage::find_present`],
//!   [`BasePage::find_clickable`] and the actions built on them) fail with
//!   `NotFound` / `NotInteractable` when the deadline passes.
//! - **Checks** ([`BasePage::is_present`], [`BasePage::is_visible`],
//!   [`BasePage::wait_until_location_contains`]) return `false` instead.
//!
//! A `StaleElement` error seen while polling or acting is retried by
//! resolving the locator again, within the same deadline.

use crate::driver::{ElementHandle, PageDriver};
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for required elements (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Default timeout for non-throwing checks (5 seconds)
pub const DEFAULT_CHECK_TIMEOUT_MS: u64 = 5_000;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout for required lookups in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Timeout for checks in milliseconds
    pub check_timeout_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            check_timeout_ms: DEFAULT_CHECK_TIMEOUT_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set check timeout in milliseconds
    #[must_use]
    pub const fn with_check_timeout(mut self, check_timeout_ms: u64) -> Self {
        self.check_timeout_ms = check_timeout_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Get check timeout as Duration
    #[must_use]
    pub const fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `check` until it yields `Some`, or `timeout` elapses.
///
/// `check` runs at least once, even with a zero timeout. Stale-element errors
/// count as "not yet"; any other error ends the poll.
pub async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> E2eResult<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        match check().await {
            Ok(Some(value)) => return Ok(Some(value)),
            Ok(None) => {}
            Err(e) if e.is_stale() => debug!(error = %e, "stale element while polling"),
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

/// Report the full configured timeout on wait failures raised after a
/// stale-element retry shortened the remaining budget
fn with_full_timeout(err: E2eError, timeout: Duration) -> E2eError {
    match err {
        E2eError::NotFound { locator, .. } => E2eError::NotFound { locator, timeout },
        E2eError::NotInteractable { locator, .. } => E2eError::NotInteractable { locator, timeout },
        other => other,
    }
}

// =============================================================================
// BASE PAGE
// =============================================================================

/// Wait/interact primitives bound to one driver session.
///
/// Screen objects embed a `BasePage` and express every action through it.
#[derive(Clone, Copy)]
pub struct BasePage<'d> {
    driver: &'d dyn PageDriver,
    options: WaitOptions,
}

impl fmt::Debug for BasePage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasePage")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'d> BasePage<'d> {
    /// Bind to a driver session
    #[must_use]
    pub fn new(driver: &'d dyn PageDriver, options: WaitOptions) -> Self {
        Self { driver, options }
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &'d dyn PageDriver {
        self.driver
    }

    /// Wait options in effect
    #[must_use]
    pub const fn options(&self) -> WaitOptions {
        self.options
    }

    /// Wait until an element matching `locator` exists, using the default timeout
    pub async fn find_present(&self, locator: &Locator) -> E2eResult<ElementHandle> {
        self.find_present_within(locator, self.options.timeout()).await
    }

    /// Wait until an element matching `locator` exists
    pub async fn find_present_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> E2eResult<ElementHandle> {
        debug!(%locator, timeout_ms = timeout.as_millis() as u64, "waiting for presence");
        let driver = self.driver;
        let found = poll_until(timeout, self.options.poll_interval(), || async move {
            Ok(driver.find_elements(locator).await?.into_iter().next())
        })
        .await?;

        found.ok_or_else(|| E2eError::NotFound {
            locator: locator.to_string(),
            timeout,
        })
    }

    /// Wait until a visible, enabled element matches `locator`, using the default timeout
    pub async fn find_clickable(&self, locator: &Locator) -> E2eResult<ElementHandle> {
        self.find_clickable_within(locator, self.options.timeout()).await
    }

    /// Wait until a visible, enabled element matches `locator`
    pub async fn find_clickable_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> E2eResult<ElementHandle> {
        debug!(%locator, timeout_ms = timeout.as_millis() as u64, "waiting for clickable");
        let driver = self.driver;
        let found = poll_until(timeout, self.options.poll_interval(), || async move {
            for element in driver.find_elements(locator).await? {
                if driver.is_displayed(&element).await? && driver.is_enabled(&element).await? {
                    return Ok(Some(element));
                }
            }
            Ok(None)
        })
        .await?;

        found.ok_or_else(|| E2eError::NotInteractable {
            locator: locator.to_string(),
            timeout,
        })
    }

    /// Resolve a clickable element and click it.
    ///
    /// Any navigation the click triggers is the caller's to wait for.
    pub async fn click(&self, locator: &Locator) -> E2eResult<()> {
        let timeout = self.options.timeout();
        let deadline = Instant::now() + timeout;
        loop {
            let element = self
                .find_clickable_within(locator, remaining(deadline))
                .await
                .map_err(|e| with_full_timeout(e, timeout))?;
            match self.driver.click(&element).await {
                Err(e) if e.is_stale() && Instant::now() < deadline => {
                    debug!(%locator, "element went stale before click, re-resolving");
                }
                other => return other,
            }
        }
    }

    /// Click the `index`-th match of `locator` (document order) once it is
    /// visible and enabled. Stale handles are re-resolved.
    pub async fn click_nth(&self, locator: &Locator, index: usize) -> E2eResult<()> {
        let timeout = self.options.timeout();
        let deadline = Instant::now() + timeout;
        let driver = self.driver;
        loop {
            let found = poll_until(remaining(deadline), self.options.poll_interval(), || async move {
                let elements = driver.find_elements(locator).await?;
                match elements.get(index) {
                    Some(e) if driver.is_displayed(e).await? && driver.is_enabled(e).await? => {
                        Ok(Some(*e))
                    }
                    _ => Ok(None),
                }
            })
            .await?;
            let element = found.ok_or_else(|| E2eError::NotInteractable {
                locator: format!("{locator} #{index}"),
                timeout,
            })?;
            match driver.click(&element).await {
                Err(e) if e.is_stale() && Instant::now() < deadline => {
                    debug!(%locator, index, "element went stale before click, re-resolving");
                }
                other => return other,
            }
        }
    }

    /// Clear a field and type `text` into it verbatim
    pub async fn type_text(&self, locator: &Locator, text: &str) -> E2eResult<()> {
        let timeout = self.options.timeout();
        let deadline = Instant::now() + timeout;
        loop {
            let element = self
                .find_present_within(locator, remaining(deadline))
                .await
                .map_err(|e| with_full_timeout(e, timeout))?;
            let result = match self.driver.clear(&element).await {
                Ok(()) => self.driver.send_keys(&element, text).await,
                Err(e) => Err(e),
            };
            match result {
                Err(e) if e.is_stale() && Instant::now() < deadline => {
                    debug!(%locator, "element went stale while typing, re-resolving");
                }
                other => return other,
            }
        }
    }

    /// Rendered text of the element (the value, for form controls)
    pub async fn read_text(&self, locator: &Locator) -> E2eResult<String> {
        let timeout = self.options.timeout();
        let deadline = Instant::now() + timeout;
        loop {
            let element = self
                .find_present_within(locator, remaining(deadline))
                .await
                .map_err(|e| with_full_timeout(e, timeout))?;
            match self.driver.text(&element).await {
                Err(e) if e.is_stale() && Instant::now() < deadline => {
                    debug!(%locator, "element went stale while reading, re-resolving");
                }
                other => return other,
            }
        }
    }

    /// Choose an option of a `<select>` by value
    pub async fn select_value(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        let timeout = self.options.timeout();
        let deadline = Instant::now() + timeout;
        loop {
            let element = self
                .find_present_within(locator, remaining(deadline))
                .await
                .map_err(|e| with_full_timeout(e, timeout))?;
            match self.driver.select_value(&element, value).await {
                Err(e) if e.is_stale() && Instant::now() < deadline => {
                    debug!(%locator, "element went stale while selecting, re-resolving");
                }
                other => return other,
            }
        }
    }

    /// Whether an element matching `locator` appears within the check timeout
    pub async fn is_present(&self, locator: &Locator) -> bool {
        self.is_present_within(locator, self.options.check_timeout()).await
    }

    /// Whether an element matching `locator` appears within `timeout`
    pub async fn is_present_within(&self, locator: &Locator, timeout: Duration) -> bool {
        let driver = self.driver;
        let found = poll_until(timeout, self.options.poll_interval(), || async move {
            Ok(driver.find_elements(locator).await?.into_iter().next())
        })
        .await;
        check_outcome(locator, found)
    }

    /// Whether a visible element matching `locator` appears within the check timeout
    pub async fn is_visible(&self, locator: &Locator) -> bool {
        self.is_visible_within(locator, self.options.check_timeout()).await
    }

    /// Whether a visible element matching `locator` appears within `timeout`
    pub async fn is_visible_within(&self, locator: &Locator, timeout: Duration) -> bool {
        let driver = self.driver;
        let found = poll_until(timeout, self.options.poll_interval(), || async move {
            for element in driver.find_elements(locator).await? {
                if driver.is_displayed(&element).await? {
                    return Ok(Some(element));
                }
            }
            Ok(None)
        })
        .await;
        check_outcome(locator, found)
    }

    /// All elements matching `locator`, waiting up to the check timeout for
    /// the first one. Empty when none appear.
    pub async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<ElementHandle>> {
        let driver = self.driver;
        let found = poll_until(
            self.options.check_timeout(),
            self.options.poll_interval(),
            || async move {
                let elements = driver.find_elements(locator).await?;
                Ok((!elements.is_empty()).then_some(elements))
            },
        )
        .await?;
        Ok(found.unwrap_or_default())
    }

    /// Text of every element matching `locator`. Empty when none appear.
    pub async fn read_all_text(&self, locator: &Locator) -> E2eResult<Vec<String>> {
        let deadline = Instant::now() + self.options.check_timeout();
        loop {
            let elements = self.find_all(locator).await?;
            let mut texts = Vec::with_capacity(elements.len());
            let mut stale = None;
            for element in &elements {
                match self.driver.text(element).await {
                    Ok(text) => texts.push(text),
                    Err(e) if e.is_stale() => {
                        stale = Some(e);
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
            match stale {
                None => return Ok(texts),
                Some(e) if Instant::now() >= deadline => return Err(e),
                Some(_) => debug!(%locator, "element list went stale, re-resolving"),
            }
        }
    }

    /// Text of `locator` when it becomes visible within the check timeout
    pub async fn read_text_if_visible(&self, locator: &Locator) -> E2eResult<Option<String>> {
        if !self.is_visible(locator).await {
            return Ok(None);
        }
        self.read_text(locator).await.map(Some)
    }

    /// Current page URL
    pub async fn current_location(&self) -> E2eResult<String> {
        self.driver.current_url().await
    }

    /// Current document title
    pub async fn current_title(&self) -> E2eResult<String> {
        self.driver.title().await
    }

    /// Whether the current URL comes to contain `fragment` within `timeout`
    pub async fn wait_until_location_contains(&self, fragment: &str, timeout: Duration) -> bool {
        self.wait_until_location_contains_any(&[fragment], timeout).await
    }

    /// Whether the current URL comes to contain any of `fragments` within `timeout`
    pub async fn wait_until_location_contains_any(
        &self,
        fragments: &[&str],
        timeout: Duration,
    ) -> bool {
        let driver = self.driver;
        let found = poll_until(timeout, self.options.poll_interval(), || async move {
            let url = driver.current_url().await?;
            Ok(fragments.iter().any(|f| url.contains(f)).then_some(url))
        })
        .await;
        match found {
            Ok(Some(url)) => {
                debug!(%url, ?fragments, "location matched");
                true
            }
            Ok(None) => false,
            Err(e) => {
                debug!(error = %e, ?fragments, "location check failed");
                false
            }
        }
    }
}

fn check_outcome(locator: &Locator, found: E2eResult<Option<ElementHandle>>) -> bool {
    match found {
        Ok(found) => found.is_some(),
        Err(e) => {
            debug!(%locator, error = %e, "check failed");
            false
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
