//! `/my-registrations` screen.

use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::E2eResult;
use crate::wait::BasePage;

/// Events the signed-in user holds a seat for
#[derive(Debug, Clone, Copy)]
pub struct MyRegistrationsPage<'d> {
    base: BasePage<'d>,
}

impl<'d> MyRegistrationsPage<'d> {
    /// Page heading
    pub const PAGE_TITLE: Locator = Locator::css("main h1");
    /// Titles of the registered events
    pub const EVENT_TITLES: Locator = Locator::css(".event-card .event-title");
    /// Event cards
    pub const EVENT_CARDS: Locator = Locator::css(".event-card");
    /// Card grid; holds the unclassed empty-state block when there are no seats
    pub const EVENTS_GRID: Locator = Locator::css(".events-grid");

    /// Bind to a session
    #[must_use]
    pub const fn new(base: BasePage<'d>) -> Self {
        Self { base }
    }

    /// Heading text
    pub async fn title(&self) -> E2eResult<String> {
        self.base.read_text(&Self::PAGE_TITLE).await
    }

    /// Whether the registrations heading is on screen
    pub async fn is_my_registrations_page(&self) -> bool {
        if !self.base.is_visible(&Self::PAGE_TITLE).await {
            return false;
        }
        self.title().await.is_ok_and(|t| t.contains("Registrations"))
    }

    /// Titles of the registered events
    pub async fn registered_titles(&self) -> E2eResult<Vec<String>> {
        self.base.read_all_text(&Self::EVENT_TITLES).await
    }

    /// Whether the grid rendered with no cards in it
    pub async fn has_no_registrations(&self) -> bool {
        self.base.is_visible(&Self::EVENTS_GRID).await
            && self
                .base
                .find_all(&Self::EVENT_CARDS)
                .await
                .is_ok_and(|cards| cards.is_empty())
    }
}

impl<'d> PageObject<'d> for MyRegistrationsPage<'d> {
    const URL_PATTERN: &'static str = "/my-registrations";

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

    mod my_registrations_tests {
        use super::*;

        #[tokio::test]
        async fn test_lists_seeded_registration() {
            let app = app();
            let session = session_at(&app, "/my-registrations").await;
            let base = BasePage::new(&session, fast());
            LoginPage::new(base)
                .login("manager@eventplanner.com", "manager123")
                .await
                .unwrap();
            // intended URL wins over the role landing page
            let page = MyRegistrationsPage::new(base);
            assert!(page.matches_location(&base.current_location().await.unwrap()));
            assert!(page.is_my_registrations_page().await);
            assert_eq!(
                page.registered_titles().await.unwrap(),
                vec!["Data Science Masterclass"]
            );
            assert!(!page.has_no_registrations().await);
        }

        #[tokio::test]
        async fn test_empty_state() {
            let app = app();
            let session = session_at(&app, "/login").await;
            let base = BasePage::new(&session, fast());
            LoginPage::new(base)
                .login("user@eventplanner.com", "user123")
                .await
                .unwrap();
            crate::driver::PageDriver::navigate(&session, &format!("{}/my-registrations", app.base_url()))
                .await
                .unwrap();
            let page = MyRegistrationsPage::new(base);
            assert!(page.has_no_registrations().await);
            assert!(page.registered_titles().await.unwrap().is_empty());
        }
    }
}
