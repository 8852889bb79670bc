//! `/home` screen: the public event listing.

use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::E2eResult;
use crate::wait::BasePage;
use chrono::Weekday;
use tracing::{debug, info};

/// Event listing with search and filters
#[derive(Debug, Clone, Copy)]
pub struct HomePage<'d> {
    base: BasePage<'d>,
}

impl<'d> HomePage<'d> {
    /// Free-text search input
    pub const SEARCH_INPUT: Locator = Locator::name("search");
    /// Category filter (auto-submits)
    pub const CATEGORY_FILTER: Locator = Locator::name("category_id");
    /// Weekday filter (auto-submits)
    pub const WEEKDAY_FILTER: Locator = Locator::name("weekday");
    /// Event cards
    pub const EVENT_CARDS: Locator = Locator::css(".event-card");
    /// Card titles
    pub const EVENT_TITLES: Locator = Locator::css(".event-card .event-title");
    /// Card meta lines: the start date, then the venue
    pub const EVENT_META: Locator = Locator::css(".event-card .event-meta");
    /// Card grid; holds the unclassed empty-state block when nothing matches
    pub const EVENTS_GRID: Locator = Locator::css(".events-grid");
    /// Signed-in user menu
    pub const USER_DROPDOWN: Locator = Locator::css(".user-dropdown");
    /// Button opening the user menu
    pub const USER_DROPDOWN_TOGGLE: Locator = Locator::css(".user-dropdown-toggle");
    /// Log-out button inside the user menu
    pub const LOGOUT_BUTTON: Locator = Locator::css("form[action$='/logout'] button");
    /// Guest login link in the header
    pub const LOGIN_LINK: Locator = Locator::css("header a[href*='login']");
    /// "Load more" pagination block
    pub const PAGINATION: Locator = Locator::css(".load-more");
    /// Page header
    pub const HEADER: Locator = Locator::tag("header");

    /// Bind to a session
    #[must_use]
    pub const fn new(base: BasePage<'d>) -> Self {
        Self { base }
    }

    /// Type a search term and press Enter
    pub async fn search_events(&self, term: &str) -> E2eResult<()> {
        info!(%term, "searching events");
        self.base
            .type_text(&Self::SEARCH_INPUT, &format!("{term}\n"))
            .await
    }

    /// Pick a category by id
    pub async fn filter_by_category(&self, category_id: u64) -> E2eResult<()> {
        info!(category_id, "filtering by category");
        self.base
            .select_value(&Self::CATEGORY_FILTER, &category_id.to_string())
            .await
    }

    /// Pick a weekday by its lowercase English name (`monday` ... `sunday`)
    pub async fn filter_by_weekday(&self, weekday: &str) -> E2eResult<()> {
        info!(%weekday, "filtering by weekday");
        self.base
            .select_value(&Self::WEEKDAY_FILTER, &weekday.to_lowercase())
            .await
    }

    /// Number of event cards shown
    pub async fn event_count(&self) -> E2eResult<usize> {
        let count = self.base.find_all(&Self::EVENT_CARDS).await?.len();
        debug!(count, "event cards");
        Ok(count)
    }

    /// Titles of the shown events, in listing order
    pub async fn event_titles(&self) -> E2eResult<Vec<String>> {
        self.base.read_all_text(&Self::EVENT_TITLES).await
    }

    /// Start dates of the shown events, as rendered on the cards
    /// (`Monday, January 15, 9:00 AM`)
    pub async fn event_dates(&self) -> E2eResult<Vec<String>> {
        let meta = self.base.read_all_text(&Self::EVENT_META).await?;
        Ok(meta.into_iter().filter(|line| is_card_date(line)).collect())
    }

    /// Open the first event
    pub async fn click_first_event(&self) -> E2eResult<()> {
        self.base.click(&Self::EVENT_TITLES).await
    }

    /// Open the event with exactly this title. `false` when no card has it.
    pub async fn click_event_by_title(&self, title: &str) -> E2eResult<bool> {
        let titles = self.event_titles().await?;
        match titles.iter().position(|t| t.trim() == title) {
            Some(index) => {
                self.base.click_nth(&Self::EVENT_TITLES, index).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether a card with this title is shown
    pub async fn is_event_displayed(&self, title: &str) -> E2eResult<bool> {
        Ok(self.event_titles().await?.iter().any(|t| t.trim() == title))
    }

    /// Whether the signed-in user menu is shown
    pub async fn is_user_logged_in(&self) -> bool {
        self.base.is_visible(&Self::USER_DROPDOWN).await
    }

    /// Whether the guest login link is shown
    pub async fn is_login_link_visible(&self) -> bool {
        self.base.is_visible(&Self::LOGIN_LINK).await
    }

    /// Whether a further page of events is offered
    pub async fn has_pagination(&self) -> bool {
        self.base.is_visible(&Self::PAGINATION).await
    }

    /// Whether the listing rendered with no cards in it
    pub async fn no_events_displayed(&self) -> bool {
        self.base.is_visible(&Self::EVENTS_GRID).await
            && self.event_count().await.is_ok_and(|n| n == 0)
    }

    /// Whether the page header is shown
    pub async fn is_header_visible(&self) -> bool {
        self.base.is_visible(&Self::HEADER).await
    }

    /// Open the user menu and log out
    pub async fn logout(&self) -> E2eResult<()> {
        info!("logging out");
        self.base.click(&Self::USER_DROPDOWN_TOGGLE).await?;
        self.base.click(&Self::LOGOUT_BUTTON).await
    }
}

/// Date lines lead with the full weekday name; venue lines never parse as one
fn is_card_date(line: &str) -> bool {
    line.split(',')
        .next()
        .is_some_and(|day| day.trim().parse::<Weekday>().is_ok())
}

impl<'d> PageObject<'d> for HomePage<'d> {
    const URL_PATTERN: &'static str = "/home";

    fn base(&self) -> &BasePage<'d> {
        &self.base
    }
}
