//! Real browser backend.
//!
//! With the `browser` feature, [`ChromiumDriver`] drives Chromium over the
//! Chrome `DevTools` Protocol through chromiumoxide. Without it, launching
//! fails with a `BrowserLaunch` error so the rest of the crate (and the
//! simulated backend) still builds and runs.

use crate::driver::{DriverConfig, ElementHandle};
use crate::result::{E2eError, E2eResult};
use std::collections::{HashMap, VecDeque};

fn launch_error(message: impl Into<String>) -> E2eError {
    E2eError::BrowserLaunch {
        message: message.into(),
    }
}

/// Decode the tagged string the text script returns: form control values
/// (`value:`) are kept verbatim, rendered text (`text:`) is trimmed.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn rendered_text(raw: &str) -> String {
    if let Some(value) = raw.strip_prefix("value:") {
        return value.to_string();
    }
    raw.strip_prefix("text:").unwrap_or(raw).trim().to_string()
}

/// Lookups whose elements stay resolvable; older handles read as stale
const KEPT_LOOKUPS: usize = 8;

/// Elements handed out by recent lookups, keyed by handle id.
///
/// Navigation bumps the epoch and drops everything. Between navigations
/// only the last [`KEPT_LOOKUPS`] lookups are retained, so polling loops
/// cannot grow the map without bound.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
struct Registry<T> {
    epoch: u64,
    next_id: u64,
    elements: HashMap<u64, T>,
    lookups: VecDeque<Vec<u64>>,
}

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            epoch: 0,
            next_id: 0,
            elements: HashMap::new(),
            lookups: VecDeque::with_capacity(KEPT_LOOKUPS),
        }
    }

    fn reset(&mut self) {
        self.epoch += 1;
        self.elements.clear();
        self.lookups.clear();
    }

    /// Store one lookup's elements and hand out their handles
    fn record(&mut self, found: impl IntoIterator<Item = T>) -> Vec<ElementHandle> {
        if self.lookups.len() == KEPT_LOOKUPS {
            for id in self.lookups.pop_front().unwrap_or_default() {
                self.elements.remove(&id);
            }
        }
        let mut ids = Vec::new();
        let mut handles = Vec::new();
        for element in found {
            self.next_id += 1;
            self.elements.insert(self.next_id, element);
            ids.push(self.next_id);
            handles.push(ElementHandle::new(self.next_id, self.epoch));
        }
        self.lookups.push_back(ids);
        handles
    }

    fn get(&self, handle: &ElementHandle) -> Option<&T> {
        if handle.epoch() != self.epoch {
            return None;
        }
        self.elements.get(&handle.id())
    }

    fn len(&self) -> usize {
        self.elements.len()
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]
mod cdp {
    use super::{launch_error, rendered_text, DriverConfig, E2eError, E2eResult, Registry};
    use crate::driver::{ElementHandle, PageDriver, Screenshot};
    use crate::locator::{Locator, Strategy};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::element::Element;
    use chromiumoxide::error::CdpError;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use tokio::sync::Mutex;

    const IS_CONNECTED: &str = "function() { return this.isConnected; }";
    const IS_DISPLAYED: &str = "function() { \
        if (!this.isConnected) return false; \
        const s = window.getComputedStyle(this); \
        const r = this.getBoundingClientRect(); \
        return s.display !== 'none' && s.visibility !== 'hidden' && (r.width > 0 || r.height > 0); }";
    const IS_ENABLED: &str = "function() { return !this.disabled; }";
    const CLEAR: &str = "function() { \
        this.value = ''; \
        this.dispatchEvent(new Event('input', { bubbles: true })); }";
    const TEXT: &str = "function() { \
        const t = this.tagName; \
        if (t === 'INPUT' || t === 'TEXTAREA' || t === 'SELECT') return 'value:' + this.value; \
        return 'text:' + this.innerText; }";

    fn driver_error(e: CdpError) -> E2eError {
        E2eError::driver(e.to_string())
    }

    /// Chromium session driven over CDP
    pub struct ChromiumDriver {
        config: DriverConfig,
        browser: Mutex<Option<CdpBrowser>>,
        page: CdpPage,
        registry: Mutex<Registry<Element>>,
        handler: tokio::task::JoinHandle<()>,
    }

    impl std::fmt::Debug for ChromiumDriver {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ChromiumDriver")
                .field("config", &self.config)
                .finish_non_exhaustive()
        }
    }

    impl ChromiumDriver {
        /// Launch Chromium and open one blank tab
        pub async fn launch(config: DriverConfig) -> E2eResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height)
                .request_timeout(config.navigation_timeout)
                .args(config.browser_args());

            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.executable_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder.build().map_err(launch_error)?;
            let (browser, mut handler) = CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| launch_error(e.to_string()))?;

            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| launch_error(e.to_string()))?;

            tracing::debug!(headless = config.headless, "chromium launched");
            Ok(Self {
                config,
                browser: Mutex::new(Some(browser)),
                page,
                registry: Mutex::new(Registry::new()),
                handler,
            })
        }

        async fn element_call(&self, handle: &ElementHandle, function: &str) -> E2eResult<serde_json::Value> {
            let registry = self.registry.lock().await;
            let element = Self::lookup(&registry, handle)?;
            let connected = element
                .call_js_fn(IS_CONNECTED, false)
                .await
                .map_err(driver_error)?
                .result
                .value;
            if connected != Some(serde_json::Value::Bool(true)) {
                return Err(E2eError::StaleElement {
                    handle: handle.to_string(),
                });
            }
            let returned = element
                .call_js_fn(function, false)
                .await
                .map_err(driver_error)?;
            Ok(returned.result.value.unwrap_or(serde_json::Value::Null))
        }

        fn lookup<'r>(registry: &'r Registry<Element>, handle: &ElementHandle) -> E2eResult<&'r Element> {
            registry.get(handle).ok_or_else(|| E2eError::StaleElement {
                handle: handle.to_string(),
            })
        }

        async fn with_timeout<T>(
            &self,
            url: &str,
            fut: impl std::future::Future<Output = Result<T, CdpError>>,
        ) -> E2eResult<T> {
            match tokio::time::timeout(self.config.navigation_timeout, fut).await {
                Ok(result) => result.map_err(|e| E2eError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }),
                Err(_) => Err(E2eError::Navigation {
                    url: url.to_string(),
                    message: format!(
                        "timed out after {}ms",
                        self.config.navigation_timeout.as_millis()
                    ),
                }),
            }
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumDriver {
        async fn navigate(&self, url: &str) -> E2eResult<()> {
            tracing::debug!(url, "navigate");
            self.with_timeout(url, self.page.goto(url)).await?;
            self.registry.lock().await.reset();
            Ok(())
        }

        async fn find_elements(&self, locator: &Locator) -> E2eResult<Vec<ElementHandle>> {
            let found = match (locator.to_css(), locator.to_xpath()) {
                (Some(css), _) => self.page.find_elements(css).await,
                (None, Some(xpath)) => self.page.find_xpaths(xpath).await,
                (None, None) => {
                    return Err(E2eError::driver(format!(
                        "{locator}: no CSS or XPath form for {}",
                        locator.strategy().label()
                    )))
                }
            }
            .map_err(driver_error)?;

            let handles = self.registry.lock().await.record(found);
            if matches!(locator.strategy(), Strategy::XPath | Strategy::LinkText) {
                tracing::trace!(%locator, count = handles.len(), "xpath lookup");
            }
            Ok(handles)
        }

        async fn is_displayed(&self, element: &ElementHandle) -> E2eResult<bool> {
            let value = self.element_call(element, IS_DISPLAYED).await?;
            Ok(value.as_bool().unwrap_or(false))
        }

        async fn is_enabled(&self, element: &ElementHandle) -> E2eResult<bool> {
            let value = self.element_call(element, IS_ENABLED).await?;
            Ok(value.as_bool().unwrap_or(false))
        }

        async fn click(&self, element: &ElementHandle) -> E2eResult<()> {
            self.element_call(element, IS_CONNECTED).await?;
            let registry = self.registry.lock().await;
            Self::lookup(&registry, element)?
                .click()
                .await
                .map_err(driver_error)?;
            Ok(())
        }

        async fn clear(&self, element: &ElementHandle) -> E2eResult<()> {
            self.element_call(element, CLEAR).await?;
            Ok(())
        }

        async fn send_keys(&self, element: &ElementHandle, text: &str) -> E2eResult<()> {
            self.element_call(element, IS_CONNECTED).await?;
            let (typed, enter) = match text.strip_suffix('\n') {
                Some(rest) => (rest, true),
                None => (text, false),
            };
            let registry = self.registry.lock().await;
            let target = Self::lookup(&registry, element)?;
            target.focus().await.map_err(driver_error)?;
            if !typed.is_empty() {
                target.type_str(typed).await.map_err(driver_error)?;
            }
            if enter {
                target.press_key("Enter").await.map_err(driver_error)?;
            }
            Ok(())
        }

        async fn select_value(&self, element: &ElementHandle, value: &str) -> E2eResult<()> {
            let literal = serde_json::to_string(value)
                .map_err(|e| E2eError::driver(e.to_string()))?;
            let function = format!(
                "function() {{ \
                 if (![...this.options].some(o => o.value === {literal})) return false; \
                 this.value = {literal}; \
                 this.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                 return true; }}"
            );
            match self.element_call(element, &function).await?.as_bool() {
                Some(true) => Ok(()),
                _ => Err(E2eError::driver(format!(
                    "element {element} has no option with value {value:?}"
                ))),
            }
        }

        async fn text(&self, element: &ElementHandle) -> E2eResult<String> {
            let value = self.element_call(element, TEXT).await?;
            Ok(rendered_text(value.as_str().unwrap_or_default()))
        }

        async fn current_url(&self) -> E2eResult<String> {
            Ok(self
                .page
                .url()
                .await
                .map_err(driver_error)?
                .unwrap_or_else(|| "about:blank".to_string()))
        }

        async fn title(&self) -> E2eResult<String> {
            Ok(self
                .page
                .get_title()
                .await
                .map_err(driver_error)?
                .unwrap_or_default())
        }

        async fn refresh(&self) -> E2eResult<()> {
            let url = self.current_url().await?;
            self.with_timeout(&url, self.page.reload()).await?;
            self.registry.lock().await.reset();
            Ok(())
        }

        async fn screenshot(&self) -> E2eResult<Screenshot> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();
            let shot = self.page.execute(params).await.map_err(driver_error)?;

            use base64::Engine;
            let data = base64::engine::general_purpose::STANDARD
                .decode(&shot.data)
                .map_err(|e| E2eError::driver(format!("screenshot decode: {e}")))?;
            Ok(Screenshot::new(data))
        }

        async fn close(&self) -> E2eResult<()> {
            let Some(mut browser) = self.browser.lock().await.take() else {
                return Ok(());
            };
            self.registry.lock().await.reset();
            let closed = browser.close().await;
            let _ = browser.wait().await;
            self.handler.abort();
            closed.map_err(|e| E2eError::Session {
                message: format!("failed to close chromium: {e}"),
            })?;
            tracing::debug!("chromium closed");
            Ok(())
        }
    }
}

// ============================================================================
// Fallback (when `browser` feature is NOT enabled)
// ============================================================================

#[cfg(not(feature = "browser"))]
mod unavailable {
    use super::{launch_error, DriverConfig, E2eError, E2eResult};
    use crate::driver::{ElementHandle, PageDriver, Screenshot};
    use crate::locator::Locator;
    use async_trait::async_trait;

    fn unavailable() -> E2eError {
        launch_error(
            "planner-e2e was built without the `browser` feature; \
             rebuild with --features browser or use the simulated backend",
        )
    }

    /// Chromium session (unavailable: built without the `browser` feature)
    #[derive(Debug)]
    pub struct ChromiumDriver {
        _private: (),
    }

    impl ChromiumDriver {
        /// Always fails: this build has no CDP support
        #[allow(clippy::unused_async)]
        pub async fn launch(_config: DriverConfig) -> E2eResult<Self> {
            Err(unavailable())
        }
    }

    // No value of this type can be built; every call reports the missing feature.
    #[async_trait]
    impl PageDriver for ChromiumDriver {
        async fn navigate(&self, _url: &str) -> E2eResult<()> {
            Err(unavailable())
        }

        async fn find_elements(&self, _locator: &Locator) -> E2eResult<Vec<ElementHandle>> {
            Err(unavailable())
        }

        async fn is_displayed(&self, _element: &ElementHandle) -> E2eResult<bool> {
            Err(unavailable())
        }

        async fn is_enabled(&self, _element: &ElementHandle) -> E2eResult<bool> {
            Err(unavailable())
        }

        async fn click(&self, _element: &ElementHandle) -> E2eResult<()> {
            Err(unavailable())
        }

        async fn clear(&self, _element: &ElementHandle) -> E2eResult<()> {
            Err(unavailable())
        }

        async fn send_keys(&self, _element: &ElementHandle, _text: &str) -> E2eResult<()> {
            Err(unavailable())
        }

        async fn select_value(&self, _element: &ElementHandle, _value: &str) -> E2eResult<()> {
            Err(unavailable())
        }

        async fn text(&self, _element: &ElementHandle) -> E2eResult<String> {
            Err(unavailable())
        }

        async fn current_url(&self) -> E2eResult<String> {
            Err(unavailable())
        }

        async fn title(&self) -> E2eResult<String> {
            Err(unavailable())
        }

        async fn refresh(&self) -> E2eResult<()> {
            Err(unavailable())
        }

        async fn screenshot(&self) -> E2eResult<Screenshot> {
            Err(unavailable())
        }

        async fn close(&self) -> E2eResult<()> {
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;

#[cfg(not(feature = "browser"))]
pub use unavailable::ChromiumDriver;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_error_kind() {
        let err = launch_error("no chromium");
        assert!(matches!(err, E2eError::BrowserLaunch { .. }));
        assert!(err.to_string().contains("no chromium"));
    }

    #[test]
    fn test_control_values_keep_whitespace() {
        assert_eq!(rendered_text("value:  padded  "), "  padded  ");
        assert_eq!(rendered_text("value:line one\n"), "line one\n");
        assert_eq!(rendered_text("value:"), "");
    }

    #[test]
    fn test_rendered_text_is_trimmed() {
        assert_eq!(rendered_text("text:\n  Tech Conference 2024 \n"), "Tech Conference 2024");
        assert_eq!(rendered_text("  untagged "), "untagged");
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_launch_without_feature_fails() {
        let err = ChromiumDriver::launch(DriverConfig::default()).await.unwrap_err();
        assert!(matches!(err, E2eError::BrowserLaunch { .. }));
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_polling_does_not_grow_the_registry() {
            let mut registry = Registry::new();
            for round in 0..500 {
                registry.record(vec![round, round + 1, round + 2]);
            }
            assert_eq!(registry.len(), KEPT_LOOKUPS * 3);
        }

        #[test]
        fn test_recent_handles_resolve_and_old_ones_go_stale() {
            let mut registry = Registry::new();
            let first = registry.record(vec!["first"]);
            let latest = (0..KEPT_LOOKUPS).map(|_| registry.record(vec!["later"])).last().unwrap();
            assert!(registry.get(&first[0]).is_none());
            assert_eq!(registry.get(&latest[0]), Some(&"later"));
        }

        #[test]
        fn test_reset_invalidates_every_handle() {
            let mut registry = Registry::new();
            let handles = registry.record(vec![1, 2]);
            registry.reset();
            assert_eq!(registry.len(), 0);
            assert!(handles.iter().all(|h| registry.get(h).is_none()));
            let fresh = registry.record(vec![3]);
            assert_eq!(fresh[0].epoch(), 1);
            assert_eq!(registry.get(&fresh[0]), Some(&3));
        }
    }
}
