//! `/events/{id}` screen.

use crate::locator::Locator;
use crate::page_object::{path_of, PageObject, UrlMatcher};
use crate::result::E2eResult;
use crate::wait::BasePage;
use tracing::info;

/// One event with its registration control
#[derive(Debug, Clone, Copy)]
pub struct EventDetailsPage<'d> {
    base: BasePage<'d>,
}

impl<'d> EventDetailsPage<'d> {
    /// Event title (the page's only heading)
    pub const EVENT_TITLE: Locator = Locator::css(".event-title, main h1");
    /// Description block
    pub const EVENT_DESCRIPTION: Locator = Locator::css(".event-description");
    /// Start date
    pub const EVENT_DATE: Locator = Locator::css(".event-date");
    /// Venue
    pub const EVENT_PLACE: Locator = Locator::css(".event-place");
    /// Price ("Free" or amount)
    pub const EVENT_PRICE: Locator = Locator::css(".event-price");
    /// Seats taken out of capacity
    pub const EVENT_CAPACITY: Locator = Locator::css(".event-capacity");
    /// Category badge
    pub const EVENT_CATEGORY: Locator = Locator::css(".event-category");
    /// Register button (signed in, not registered)
    pub const REGISTER_BUTTON: Locator = Locator::css("form[action$='/register'] button");
    /// Unregister button (signed in, registered)
    pub const UNREGISTER_BUTTON: Locator = Locator::css("form[action$='/unregister'] button");
    /// Guest link to the sign-in screen; the header's login link sits outside `main`
    pub const LOGIN_TO_REGISTER: Locator = Locator::css("main a[href$='/login']");
    /// Disabled control shown when no seats are left
    pub const EVENT_FULL: Locator = Locator::css("main button[disabled]");
    /// Notice shown for archived events
    pub const REGISTRATION_CLOSED: Locator = Locator::css(".registration-closed");
    /// Success banner
    pub const SUCCESS_MESSAGE: Locator = Locator::css(".alert-success");
    /// Error banner
    pub const ERROR_MESSAGE: Locator = Locator::css(".alert-error");
    /// Link back to the listing
    pub const BACK_LINK: Locator = Locator::css("main a[href$='/home']");

    /// Bind to a session
    #[must_use]
    pub const fn new(base: BasePage<'d>) -> Self {
        Self { base }
    }

    async fn read_or_empty(&self, locator: &Locator) -> E2eResult<String> {
        if !self.base.is_present(locator).await {
            return Ok(String::new());
        }
        Ok(self.base.read_text(locator).await?.trim().to_string())
    }

    /// Event title
    pub async fn title(&self) -> E2eResult<String> {
        self.read_or_empty(&Self::EVENT_TITLE).await
    }

    /// Description text
    pub async fn description(&self) -> E2eResult<String> {
        self.read_or_empty(&Self::EVENT_DESCRIPTION).await
    }

    /// Start date as rendered
    pub async fn date(&self) -> E2eResult<String> {
        self.read_or_empty(&Self::EVENT_DATE).await
    }

    /// Venue
    pub async fn place(&self) -> E2eResult<String> {
        self.read_or_empty(&Self::EVENT_PLACE).await
    }

    /// Price label
    pub async fn price(&self) -> E2eResult<String> {
        self.read_or_empty(&Self::EVENT_PRICE).await
    }

    /// Capacity label
    pub async fn capacity(&self) -> E2eResult<String> {
        self.read_or_empty(&Self::EVENT_CAPACITY).await
    }

    /// Category name
    pub async fn category(&self) -> E2eResult<String> {
        self.read_or_empty(&Self::EVENT_CATEGORY).await
    }

    /// Id of the event on screen, taken from the location
    pub async fn event_id(&self) -> E2eResult<Option<u64>> {
        let url = self.base.current_location().await?;
        Ok(UrlMatcher::new(Self::URL_PATTERN)
            .extract_params(&path_of(&url))
            .get("id")
            .and_then(|id| id.parse().ok()))
    }

    /// Register for the event
    pub async fn click_register_button(&self) -> E2eResult<()> {
        info!("registering for event");
        self.base.click(&Self::REGISTER_BUTTON).await
    }

    /// Cancel the registration
    pub async fn click_unregister_button(&self) -> E2eResult<()> {
        info!("unregistering from event");
        self.base.click(&Self::UNREGISTER_BUTTON).await
    }

    /// Follow the guest "login to register" link
    pub async fn click_login_to_register(&self) -> E2eResult<()> {
        self.base.click(&Self::LOGIN_TO_REGISTER).await
    }

    /// Return to the listing
    pub async fn click_back(&self) -> E2eResult<()> {
        self.base.click(&Self::BACK_LINK).await
    }

    /// Whether the register button is shown
    pub async fn is_register_button_visible(&self) -> bool {
        self.base.is_visible(&Self::REGISTER_BUTTON).await
    }

    /// Whether the unregister button is shown
    pub async fn is_unregister_button_visible(&self) -> bool {
        self.base.is_visible(&Self::UNREGISTER_BUTTON).await
    }

    /// Whether the guest "login to register" link is shown
    pub async fn is_login_to_register_visible(&self) -> bool {
        self.base.is_visible(&Self::LOGIN_TO_REGISTER).await
    }

    /// Whether the event is shown as full
    pub async fn is_full(&self) -> bool {
        self.base.is_visible(&Self::EVENT_FULL).await
    }

    /// Whether registration is closed (archived event)
    pub async fn is_registration_closed(&self) -> bool {
        self.base.is_visible(&Self::REGISTRATION_CLOSED).await
    }

    /// Whether the signed-in user holds a seat
    pub async fn is_registered(&self) -> bool {
        self.is_unregister_button_visible().await
    }

    /// Success banner text, if one is shown
    pub async fn success_message(&self) -> E2eResult<Option<String>> {
        self.base.read_text_if_visible(&Self::SUCCESS_MESSAGE).await
    }

    /// Error banner text, if one is shown
    pub async fn error_message(&self) -> E2eResult<Option<String>> {
        self.base.read_text_if_visible(&Self::ERROR_MESSAGE).await
    }

    /// Whether an event is on screen
    pub async fn is_event_details_page(&self) -> E2eResult<bool> {
        let url = self.base.current_location().await?;
        Ok(self.matches_location(&url) && self.base.is_visible(&Self::EVENT_TITLE).await)
    }
}

impl<'d> PageObject<'d> for EventDetailsPage<'d> {
    const URL_PATTERN: &'static str = "/events/:id";

    fn base(&self) -> &BasePage<'d> {
        &self.base
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pages::test_support::{app, fast, session_at};
    use crate::pages::LoginPage;
    use crate::sim::routes::{MSG_REGISTERED, MSG_UNREGISTERED};
    use crate::sim::SimulatedSession;

    async fn signed_in(app: &crate::sim::SimulatedApp, path: &str) -> SimulatedSession {
        let session = session_at(app, "/login").await;
        LoginPage::new(BasePage::new(&session, fast()))
            .login("user@eventplanner.com", "user123")
            .await
            .unwrap();
        crate::driver::PageDriver::navigate(&session, &format!("{}{path}", app.base_url()))
            .await
            .unwrap();
        session
    }

    mod reader_tests {
        use super::*;

        #[tokio::test]
        async fn test_reads_event_facts() {
            let app = app();
            let session = session_at(&app, "/events/1").await;
            let page = EventDetailsPage::new(BasePage::new(&session, fast()));
            assert!(page.is_event_details_page().await.unwrap());
            assert_eq!(page.title().await.unwrap(), "Tech Conference 2024");
            assert!(page.description().await.unwrap().contains("technology conference"));
            assert_eq!(page.place().await.unwrap(), "Convention Center, Downtown");
            assert_eq!(page.price().await.unwrap(), "TND 299.99");
            assert_eq!(page.capacity().await.unwrap(), "0 / 500 registered");
            assert_eq!(page.category().await.unwrap(), "Technology");
            assert!(page.date().await.unwrap().contains("2024"));
            assert_eq!(page.event_id().await.unwrap(), Some(1));
        }

        #[tokio::test]
        async fn test_guest_sees_login_link() {
            let app = app();
            let session = session_at(&app, "/events/2").await;
            let base = BasePage::new(&session, fast());
            let page = EventDetailsPage::new(base);
            assert!(page.is_login_to_register_visible().await);
            assert!(!page.is_register_button_visible().await);
            page.click_login_to_register().await.unwrap();
            assert!(base.current_location().await.unwrap().contains("login"));
        }

        #[tokio::test]
        async fn test_archived_event_is_closed() {
            let app = app();
            let session = signed_in(&app, "/events/7").await;
            let page = EventDetailsPage::new(BasePage::new(&session, fast()));
            assert!(page.is_registration_closed().await);
            assert!(!page.is_register_button_visible().await);
        }

        #[tokio::test]
        async fn test_back_link() {
            let app = app();
            let session = session_at(&app, "/events/3").await;
            let base = BasePage::new(&session, fast());
            EventDetailsPage::new(base).click_back().await.unwrap();
            assert!(base.current_location().await.unwrap().ends_with("/home"));
        }
    }

    mod registration_tests {
        use super::*;

        #[tokio::test]
        async fn test_register_then_unregister() {
            let app = app();
            let session = signed_in(&app, "/events/2").await;
            let page = EventDetailsPage::new(BasePage::new(&session, fast()));
            assert!(!page.is_registered().await);

            page.click_register_button().await.unwrap();
            assert_eq!(page.success_message().await.unwrap().as_deref(), Some(MSG_REGISTERED));
            assert!(page.is_registered().await);
            assert_eq!(page.capacity().await.unwrap(), "1 / 50 registered");

            page.click_unregister_button().await.unwrap();
            assert_eq!(page.success_message().await.unwrap().as_deref(), Some(MSG_UNREGISTERED));
            assert!(page.is_register_button_visible().await);
            assert_eq!(page.error_message().await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_full_event() {
            let app = app();
            let session = signed_in(&app, "/events/6").await;
            let page = EventDetailsPage::new(BasePage::new(&session, fast()));
            assert!(page.is_full().await);
            assert!(!page.is_register_button_visible().await);
        }
    }
}
