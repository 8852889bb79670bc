//! In-process simulation of the event planner application.
//!
//! [`SimulatedApp`] holds the server side (seeded data behind a lock) and
//! hands out one [`SimulatedSession`] per scenario. A session is a tiny
//! browser: it keeps a cookie, the current URL and the rendered
//! [`dom::Document`], and implements [`PageDriver`] on top of them.
//!
//! Browser behaviour modelled:
//!
//! - every page load bumps the render epoch, so older handles go stale
//! - pages become queryable only after the configured render delay
//! - `required` and `type=email` inputs block form submission client-side
//! - `data-toggle` buttons show and hide a target, `data-href` cards and
//!   `data-autosubmit` selects navigate like their scripted counterparts
//! - a trailing `\n` in typed text presses Enter

pub mod dom;
pub mod routes;
pub mod selector;
pub mod state;
pub mod views;

use crate::driver::{ElementHandle, PageDriver, Screenshot};
use crate::locator::{Locator, Strategy};
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use dom::{Document, NodeId};
use routes::{Request, Response, SessionCookie};
use selector::Selector;
use state::AppState;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use url::Url;

/// Redirect hops followed before a load is abandoned
const MAX_REDIRECTS: usize = 10;

/// Smallest valid PNG (1x1, transparent)
const BLANK_PNG: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Simulation knobs
#[derive(Debug, Clone, Copy, Default)]
pub struct SimOptions {
    /// Time between a page load and its elements becoming queryable
    pub render_delay: Duration,
    /// Date event schedules are seeded around (defaults to today)
    pub today: Option<NaiveDate>,
}

impl SimOptions {
    /// Set the render delay
    #[must_use]
    pub const fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Pin the seeding date
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

/// The simulated server, shared by every session opened from it
#[derive(Debug, Clone)]
pub struct SimulatedApp {
    base: Url,
    options: SimOptions,
    state: Arc<Mutex<AppState>>,
}

impl SimulatedApp {
    /// Serve seeded data at `base_url`
    pub fn new(base_url: &str) -> E2eResult<Self> {
        Self::with_options(base_url, SimOptions::default())
    }

    /// Serve seeded data at `base_url` with explicit options
    pub fn with_options(base_url: &str, options: SimOptions) -> E2eResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| E2eError::config(format!("invalid base URL {base_url}: {e}")))?;
        let today = options.today.unwrap_or_else(|| Local::now().date_naive());
        Ok(Self {
            base,
            options,
            state: Arc::new(Mutex::new(AppState::seeded(today))),
        })
    }

    /// Base URL the application answers on, without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Open a fresh browser session with an empty cookie jar
    #[must_use]
    pub fn open_session(&self) -> SimulatedSession {
        SimulatedSession {
            app: self.clone(),
            browser: Mutex::new(Browser::blank()),
        }
    }

    /// Read server-side data
    pub fn inspect<R>(&self, read: impl FnOnce(&AppState) -> R) -> E2eResult<R> {
        Ok(read(&*lock(&self.state)?))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> E2eResult<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| E2eError::Session {
        message: "simulated browser state poisoned".to_string(),
    })
}

struct Browser {
    url: Option<Url>,
    doc: Document,
    epoch: u64,
    ready_at: Instant,
    cookie: SessionCookie,
    closed: bool,
}

impl Browser {
    fn blank() -> Self {
        Self {
            url: None,
            doc: Document::new(""),
            epoch: 0,
            ready_at: Instant::now(),
            cookie: SessionCookie::default(),
            closed: false,
        }
    }
}

/// One scenario's browser against a [`SimulatedApp`]
pub struct SimulatedSession {
    app: SimulatedApp,
    browser: Mutex<Browser>,
}

impl std::fmt::Debug for SimulatedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedSession")
            .field("base", &self.app.base.as_str())
            .finish_non_exhaustive()
    }
}

impl SimulatedSession {
    fn with_browser<R>(&self, act: impl FnOnce(&mut Browser) -> E2eResult<R>) -> E2eResult<R> {
        let mut browser = lock(&self.browser)?;
        if browser.closed {
            return Err(E2eError::Session {
                message: "session is closed".to_string(),
            });
        }
        act(&mut browser)
    }

    fn resolve(browser: &Browser, handle: &ElementHandle) -> E2eResult<NodeId> {
        let id = usize::try_from(handle.id()).ok();
        match id {
            Some(id) if handle.epoch() == browser.epoch && browser.doc.node(id).is_some() => Ok(id),
            _ => Err(E2eError::StaleElement {
                handle: handle.to_string(),
            }),
        }
    }

    fn interactable(browser: &Browser, handle: &ElementHandle) -> E2eResult<NodeId> {
        let id = Self::resolve(browser, handle)?;
        if browser.doc.is_visible(id) {
            Ok(id)
        } else {
            Err(E2eError::driver(format!("element {handle} is not interactable")))
        }
    }

    /// Resolve `target` against the current page (or the base URL before
    /// the first load)
    fn resolve_url(&self, browser: &Browser, target: &str) -> E2eResult<Url> {
        browser
            .url
            .as_ref()
            .unwrap_or(&self.app.base)
            .join(target)
            .map_err(|e| E2eError::Navigation {
                url: target.to_string(),
                message: e.to_string(),
            })
    }

    /// Follow `target` (absolute or relative to the current page)
    fn visit(&self, browser: &mut Browser, target: &str) -> E2eResult<()> {
        let url = self.resolve_url(browser, target)?;
        let req = Request::get(url.path(), url.query_pairs().into_owned().collect());
        self.load(browser, url, req)
    }

    fn load(&self, browser: &mut Browser, mut url: Url, mut req: Request) -> E2eResult<()> {
        if url.origin() != self.app.base.origin() {
            return Err(E2eError::Navigation {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        let mut state = lock(&self.app.state)?;
        for _ in 0..MAX_REDIRECTS {
            match routes::handle(&mut state, &mut browser.cookie, &req) {
                Response::Page(doc) => {
                    tracing::trace!(url = %url, title = doc.title(), "page rendered");
                    browser.url = Some(url);
                    browser.doc = doc;
                    browser.epoch += 1;
                    browser.ready_at = Instant::now() + self.app.options.render_delay;
                    return Ok(());
                }
                Response::Redirect(location) => {
                    url = url.join(&location).map_err(|e| E2eError::Navigation {
                        url: location.clone(),
                        message: e.to_string(),
                    })?;
                    req = Request::get(url.path(), url.query_pairs().into_owned().collect());
                }
            }
        }
        Err(E2eError::Navigation {
            url: url.to_string(),
            message: "too many redirects".to_string(),
        })
    }

    /// Submit the form `form`, honouring client-side constraints
    fn submit(&self, browser: &mut Browser, form: NodeId) -> E2eResult<()> {
        let doc = &browser.doc;
        let controls: Vec<NodeId> = doc
            .descendants(form)
            .into_iter()
            .filter(|&id| doc.node(id).is_some_and(dom::Node::is_form_control))
            .collect();

        let mut pairs = Vec::new();
        for id in controls {
            let Some(node) = doc.node(id) else { continue };
            let value = node.attr("value").unwrap_or_default();
            if node.has_attr("required") && value.trim().is_empty() {
                tracing::trace!(field = node.attr("name"), "submission blocked: required");
                return Ok(());
            }
            if node.attr("type") == Some("email")
                && !value.is_empty()
                && !routes::is_valid_email(value)
            {
                tracing::trace!(field = node.attr("name"), "submission blocked: email");
                return Ok(());
            }
            if let Some(name) = node.attr("name") {
                pairs.push((name.to_string(), value.to_string()));
            }
        }

        let Some(form_node) = doc.node(form) else {
            return Ok(());
        };
        let action = form_node.attr("action").unwrap_or_default().to_string();
        let method = form_node.attr("method").unwrap_or("GET");
        if method.eq_ignore_ascii_case("GET") {
            let mut target = self.resolve_url(browser, &action)?;
            target.query_pairs_mut().clear().extend_pairs(&pairs);
            let req = Request::get(target.path(), pairs);
            self.load(browser, target, req)
        } else {
            let target = self.resolve_url(browser, &action)?;
            let req = Request::submit(target.path(), pairs);
            self.load(browser, target, req)
        }
    }

    fn activate(&self, browser: &mut Browser, id: NodeId) -> E2eResult<()> {
        let doc = &browser.doc;
        let Some(node) = doc.node(id) else {
            return Ok(());
        };
        if node.has_attr("disabled") {
            return Ok(());
        }
        if let Some(target) = node.attr("data-toggle") {
            let selector = parse_selector(target)?;
            for toggled in selector.select(doc) {
                browser.doc.toggle_visible(toggled);
            }
            return Ok(());
        }

        // the clicked node or its nearest actionable ancestor
        let actionable = std::iter::once(id).chain(doc.ancestors(id)).find_map(|n| {
            let node = doc.node(n)?;
            if node.tag == "a" {
                node.attr("href").map(|h| Action::Follow(h.to_string()))
            } else if let Some(href) = node.attr("data-href") {
                Some(Action::Follow(href.to_string()))
            } else if node.is_submit() {
                doc.closest(n, "form").map(Action::Submit)
            } else {
                None
            }
        });
        match actionable {
            Some(Action::Follow(href)) => self.visit(browser, &href),
            Some(Action::Submit(form)) => self.submit(browser, form),
            None => Ok(()),
        }
    }
}

enum Action {
    Follow(String),
    Submit(NodeId),
}

fn parse_selector(text: &str) -> E2eResult<Selector> {
    Selector::parse(text).map_err(|e| E2eError::driver(e.to_string()))
}

#[async_trait]
impl PageDriver for SimulatedSession {
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        tracing::debug!(url, "navigate");
        self.with_browser(|b| self.visit(b, url))
    }

    async fn find_elements(&self, locator: &Locator) -> E2eResult<Vec<ElementHandle>> {
        self.with_browser(|b| {
            if Instant::now() < b.ready_at {
                return Ok(Vec::new());
            }
            let ids: Vec<NodeId> = match locator.strategy() {
                Strategy::LinkText => b
                    .doc
                    .walk()
                    .into_iter()
                    .filter(|&id| {
                        b.doc.node(id).is_some_and(|n| n.tag == "a")
                            && b.doc.text_content(id) == locator.value().trim()
                    })
                    .collect(),
                Strategy::XPath => {
                    return Err(E2eError::driver(format!(
                        "{locator}: XPath is not supported by the simulated browser"
                    )))
                }
                Strategy::Css | Strategy::Name | Strategy::Id | Strategy::TagName => {
                    let css = locator.to_css().unwrap_or_default();
                    parse_selector(&css)?.select(&b.doc)
                }
            };
            Ok(ids
                .into_iter()
                .map(|id| ElementHandle::new(id as u64, b.epoch))
                .collect())
        })
    }

    async fn is_displayed(&self, element: &ElementHandle) -> E2eResult<bool> {
        self.with_browser(|b| {
            let id = Self::resolve(b, element)?;
            Ok(b.doc.is_visible(id))
        })
    }

    async fn is_enabled(&self, element: &ElementHandle) -> E2eResult<bool> {
        self.with_browser(|b| {
            let id = Self::resolve(b, element)?;
            Ok(b.doc.node(id).is_some_and(|n| !n.has_attr("disabled")))
        })
    }

    async fn click(&self, element: &ElementHandle) -> E2eResult<()> {
        self.with_browser(|b| {
            let id = Self::interactable(b, element)?;
            self.activate(b, id)
        })
    }

    async fn clear(&self, element: &ElementHandle) -> E2eResult<()> {
        self.with_browser(|b| {
            let id = Self::interactable(b, element)?;
            if !b.doc.node(id).is_some_and(dom::Node::is_text_control) {
                return Err(E2eError::driver(format!("element {element} cannot be cleared")));
            }
            b.doc.set_attr(id, "value", "");
            Ok(())
        })
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> E2eResult<()> {
        self.with_browser(|b| {
            let id = Self::interactable(b, element)?;
            let Some(node) = b.doc.node(id).filter(|n| n.is_text_control()) else {
                return Err(E2eError::driver(format!("element {element} does not accept text")));
            };
            let (typed, enter) = match text.strip_suffix('\n') {
                Some(rest) => (rest, true),
                None => (text, false),
            };
            let value = format!("{}{typed}", node.attr("value").unwrap_or_default());
            b.doc.set_attr(id, "value", value);
            if enter {
                if let Some(form) = b.doc.closest(id, "form") {
                    return self.submit(b, form);
                }
            }
            Ok(())
        })
    }

    async fn select_value(&self, element: &ElementHandle, value: &str) -> E2eResult<()> {
        self.with_browser(|b| {
            let id = Self::interactable(b, element)?;
            let doc = &b.doc;
            let is_select = doc.node(id).is_some_and(|n| n.tag == "select");
            let has_option = doc.descendants(id).into_iter().any(|o| {
                doc.node(o)
                    .is_some_and(|n| n.tag == "option" && n.attr("value") == Some(value))
            });
            if !is_select || !has_option {
                return Err(E2eError::driver(format!(
                    "element {element} has no option with value {value:?}"
                )));
            }
            let autosubmit = doc.node(id).is_some_and(|n| n.has_attr("data-autosubmit"));
            b.doc.set_attr(id, "value", value);
            match b.doc.closest(id, "form") {
                Some(form) if autosubmit => self.submit(b, form),
                _ => Ok(()),
            }
        })
    }

    async fn text(&self, element: &ElementHandle) -> E2eResult<String> {
        self.with_browser(|b| {
            let id = Self::resolve(b, element)?;
            let text = match b.doc.node(id) {
                Some(n) if n.is_form_control() => n.attr("value").unwrap_or_default().to_string(),
                _ => b.doc.text_content(id),
            };
            Ok(text)
        })
    }

    async fn current_url(&self) -> E2eResult<String> {
        self.with_browser(|b| {
            Ok(b.url
                .as_ref()
                .map_or_else(|| "about:blank".to_string(), Url::to_string))
        })
    }

    async fn title(&self) -> E2eResult<String> {
        self.with_browser(|b| Ok(b.doc.title().to_string()))
    }

    async fn refresh(&self) -> E2eResult<()> {
        self.with_browser(|b| {
            let Some(url) = b.url.clone() else {
                return Ok(());
            };
            let req = Request::get(url.path(), url.query_pairs().into_owned().collect());
            self.load(b, url, req)
        })
    }

    async fn screenshot(&self) -> E2eResult<Screenshot> {
        self.with_browser(|_| Ok(Screenshot::new(BLANK_PNG.to_vec())))
    }

    async fn close(&self) -> E2eResult<()> {
        let mut browser = lock(&self.browser)?;
        browser.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8000";

    fn app() -> SimulatedApp {
        let today = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        SimulatedApp::with_options(BASE, SimOptions::default().with_today(today)).unwrap()
    }

    async fn first(session: &SimulatedSession, locator: &Locator) -> ElementHandle {
        session.find_elements(locator).await.unwrap()[0]
    }

    async fn sign_in(session: &SimulatedSession, email: &str, password: &str) {
        session.navigate(&format!("{BASE}/login")).await.unwrap();
        let e = first(session, &Locator::name("email")).await;
        session.send_keys(&e, email).await.unwrap();
        let p = first(session, &Locator::name("password")).await;
        session.send_keys(&p, password).await.unwrap();
        let submit = first(session, &Locator::css("button[type='submit']")).await;
        session.click(&submit).await.unwrap();
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_root_redirects_home() {
            let session = app().open_session();
            session.navigate(BASE).await.unwrap();
            assert_eq!(session.current_url().await.unwrap(), format!("{BASE}/home"));
            assert_eq!(session.title().await.unwrap(), "Home - Event Planner");
        }

        #[tokio::test]
        async fn test_foreign_origin_is_refused() {
            let session = app().open_session();
            let err = session.navigate("http://localhost:9999/login").await.unwrap_err();
            assert!(matches!(err, E2eError::Navigation { .. }));
        }

        #[tokio::test]
        async fn test_handles_go_stale_after_load() {
            let session = app().open_session();
            session.navigate(&format!("{BASE}/login")).await.unwrap();
            let email = first(&session, &Locator::name("email")).await;
            session.refresh().await.unwrap();
            let err = session.text(&email).await.unwrap_err();
            assert!(err.is_stale());
        }

        #[tokio::test]
        async fn test_render_delay_hides_elements() {
            let options = SimOptions::default().with_render_delay(Duration::from_millis(80));
            let session = SimulatedApp::with_options(BASE, options).unwrap().open_session();
            session.navigate(&format!("{BASE}/login")).await.unwrap();
            assert!(session.find_elements(&Locator::name("email")).await.unwrap().is_empty());
            tokio::time::sleep(Duration::from_millis(120)).await;
            assert_eq!(session.find_elements(&Locator::name("email")).await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_closed_session_rejects_calls() {
            let session = app().open_session();
            session.close().await.unwrap();
            assert!(session.navigate(BASE).await.is_err());
            assert!(session.close().await.is_ok());
        }
    }

    mod form_tests {
        use super::*;

        #[tokio::test]
        async fn test_login_flow() {
            let session = app().open_session();
            sign_in(&session, "user@eventplanner.com", "user123").await;
            assert_eq!(session.current_url().await.unwrap(), format!("{BASE}/home"));
            assert_eq!(
                session.find_elements(&Locator::css(".user-dropdown")).await.unwrap().len(),
                1
            );
        }

        #[tokio::test]
        async fn test_required_field_blocks_submission() {
            let session = app().open_session();
            session.navigate(&format!("{BASE}/login")).await.unwrap();
            let submit = first(&session, &Locator::css("button[type='submit']")).await;
            session.click(&submit).await.unwrap();
            assert_eq!(session.current_url().await.unwrap(), format!("{BASE}/login"));
            // no page load happened, so the handle is still fresh
            assert!(session.is_displayed(&submit).await.unwrap());
        }

        #[tokio::test]
        async fn test_malformed_email_blocks_submission() {
            let session = app().open_session();
            sign_in(&session, "invalid-email-format", "user123").await;
            assert_eq!(session.current_url().await.unwrap(), format!("{BASE}/login"));
            assert!(session.find_elements(&Locator::css(".alert-error")).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_enter_submits_search() {
            let session = app().open_session();
            session.navigate(&format!("{BASE}/home")).await.unwrap();
            let search = first(&session, &Locator::name("search")).await;
            session.send_keys(&search, "Tech\n").await.unwrap();
            let url = session.current_url().await.unwrap();
            assert!(url.contains("search=Tech"), "{url}");
            let titles = session.find_elements(&Locator::css(".event-card .event-title")).await.unwrap();
            assert_eq!(titles.len(), 1);
        }

        #[tokio::test]
        async fn test_select_autosubmits() {
            let session = app().open_session();
            session.navigate(&format!("{BASE}/home")).await.unwrap();
            let category = first(&session, &Locator::name("category_id")).await;
            session.select_value(&category, "4").await.unwrap();
            let cards = session.find_elements(&Locator::css(".event-card")).await.unwrap();
            assert_eq!(cards.len(), 1);
            let select = first(&session, &Locator::name("category_id")).await;
            assert_eq!(session.text(&select).await.unwrap(), "4");
        }

        #[tokio::test]
        async fn test_dropdown_toggle_and_logout() {
            let session = app().open_session();
            sign_in(&session, "user@eventplanner.com", "user123").await;
            let logout = first(&session, &Locator::css("form[action$='/logout'] button")).await;
            assert!(!session.is_displayed(&logout).await.unwrap());
            assert!(session.click(&logout).await.is_err());

            let toggle = first(&session, &Locator::css(".user-dropdown-toggle")).await;
            session.click(&toggle).await.unwrap();
            assert!(session.is_displayed(&logout).await.unwrap());
            session.click(&logout).await.unwrap();
            assert_eq!(session.current_url().await.unwrap(), format!("{BASE}/login"));
        }

        #[tokio::test]
        async fn test_card_click_opens_details() {
            let session = app().open_session();
            session.navigate(&format!("{BASE}/home")).await.unwrap();
            let title = first(&session, &Locator::css(".event-card .event-title")).await;
            assert_eq!(session.text(&title).await.unwrap(), "Art Gallery Opening");
            session.click(&title).await.unwrap();
            assert_eq!(session.current_url().await.unwrap(), format!("{BASE}/events/4"));
        }

        #[tokio::test]
        async fn test_sessions_share_server_data() {
            let app = app();
            let a = app.open_session();
            sign_in(&a, "user@eventplanner.com", "user123").await;
            a.navigate(&format!("{BASE}/events/1")).await.unwrap();
            let register = first(&a, &Locator::css("form[action$='/register'] button")).await;
            a.click(&register).await.unwrap();

            let seats = app.inspect(|s| s.registered_count(1)).unwrap();
            assert_eq!(seats, 1);

            let b = app.open_session();
            b.navigate(&format!("{BASE}/my-registrations")).await.unwrap();
            assert_eq!(b.current_url().await.unwrap(), format!("{BASE}/login"));
        }

        #[tokio::test]
        async fn test_link_text_and_xpath() {
            let session = app().open_session();
            session.navigate(&format!("{BASE}/home")).await.unwrap();
            let links = session.find_elements(&Locator::link_text("Login")).await.unwrap();
            assert_eq!(links.len(), 1);
            assert!(session.find_elements(&Locator::xpath("//a")).await.is_err());
        }

        #[tokio::test]
        async fn test_screenshot_is_png() {
            let session = app().open_session();
            let shot = session.screenshot().await.unwrap();
            assert!(shot.is_valid());
            assert_eq!(&shot.data[..4], &[0x89, b'P', b'N', b'G']);
        }
    }
}
