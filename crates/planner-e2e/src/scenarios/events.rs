//! Listing, search, filter and details scenarios.

use crate::config::Role;
use crate::pages::{EventDetailsPage, HomePage};
use crate::result::E2eResult;
use crate::scenario::{ensure, ScenarioContext, Verdict};
use chrono::Weekday;

/// Search term no event title or description contains
const NO_MATCH_TERM: &str = "xyznonexistent123abc";

/// Category id of the seeded "Technology" category
const TECHNOLOGY_CATEGORY: u64 = 1;

/// The listing is reachable without signing in
pub async fn public_listing(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.open("/home").await?;
    let home = HomePage::new(ctx.base());
    ensure(home.is_header_visible().await, "header shown", "visible", "hidden")?;
    let count = home.event_count().await?;
    ctx.observe(format_args!("{count} events listed"));
    Ok(Verdict::Passed)
}

/// Searching for a word of a listed title keeps that event listed
pub async fn search_by_title(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.open("/home").await?;
    let home = HomePage::new(ctx.base());
    let titles = home.event_titles().await?;
    let Some(term) = titles
        .first()
        .and_then(|t| t.split_whitespace().next())
        .map(str::to_string)
    else {
        return ctx.skip("no events listed to search for");
    };

    home.search_events(&term).await?;
    ctx.expect_location(&["search"]).await?;
    let count = home.event_count().await?;
    ctx.observe(format_args!("{count} events match {term:?}"));
    ensure(count > 0, "search results", format!("events matching {term:?}"), "none")?;
    Ok(Verdict::Passed)
}

/// A term matching nothing empties the listing
pub async fn search_no_results(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.open("/home").await?;
    let home = HomePage::new(ctx.base());
    home.search_events(NO_MATCH_TERM).await?;
    ctx.expect_location(&["search"]).await?;

    let count = home.event_count().await?;
    let empty_state = home.no_events_displayed().await;
    ensure(
        count == 0 || empty_state,
        "search without matches",
        "no events or the empty-state message",
        format!("{count} events"),
    )?;
    Ok(Verdict::Passed)
}

/// Choosing a category reloads the listing filtered by it
pub async fn filter_by_category(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.open("/home").await?;
    let home = HomePage::new(ctx.base());
    home.filter_by_category(TECHNOLOGY_CATEGORY).await?;
    ctx.expect_location(&["category_id="]).await?;
    let count = home.event_count().await?;
    ctx.observe(format_args!("{count} events in category {TECHNOLOGY_CATEGORY}"));
    Ok(Verdict::Passed)
}

/// Choosing a weekday keeps only events starting on that day
pub async fn filter_by_weekday(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.open("/home").await?;
    let home = HomePage::new(ctx.base());
    let dates = home.event_dates().await?;
    let Some(day) = dates
        .first()
        .and_then(|d| d.split(',').next())
        .map(str::trim)
        .filter(|d| d.parse::<Weekday>().is_ok())
        .map(str::to_string)
    else {
        return ctx.skip("no listed event shows a weekday");
    };

    home.filter_by_weekday(&day).await?;
    ctx.expect_location(&["weekday="]).await?;
    let filtered = home.event_dates().await?;
    ctx.observe(format_args!("{} events on {day}", filtered.len()));
    ensure(!filtered.is_empty(), "weekday results", format!("events on {day}"), "none")?;
    let stray: Vec<&String> = filtered.iter().filter(|d| !d.starts_with(&day)).collect();
    ensure(
        stray.is_empty(),
        "weekday filter",
        format!("only {day} events"),
        format!("{stray:?}"),
    )?;
    Ok(Verdict::Passed)
}

/// Clicking a card opens its details
pub async fn view_event_details(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.open("/home").await?;
    let home = HomePage::new(ctx.base());
    if home.event_count().await? == 0 {
        return ctx.skip("no events listed");
    }

    home.click_first_event().await?;
    ctx.expect_location(&["/events/"]).await?;
    let details = EventDetailsPage::new(ctx.base());
    ensure(
        details.is_event_details_page().await?,
        "details shown",
        "event details screen",
        ctx.base().current_location().await?,
    )?;
    let title = details.title().await?;
    let place = details.place().await?;
    ctx.observe(format_args!("viewing {title:?} at {place}"));
    ensure(!title.is_empty(), "event title", "non-empty", "empty")?;
    Ok(Verdict::Passed)
}

/// Guests see the listing with a login link and no user menu
pub async fn home_public_access(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.open("/home").await?;
    let home = HomePage::new(ctx.base());
    ensure(home.is_header_visible().await, "header shown", "visible", "hidden")?;
    ensure(home.is_login_link_visible().await, "login link", "visible", "hidden")?;
    ensure(!home.is_user_logged_in().await, "user menu", "hidden", "visible")?;
    Ok(Verdict::Passed)
}

/// Signed-in users see their menu instead of the login link
pub async fn home_logged_in_view(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.login_as(Role::User).await?;
    ctx.open("/home").await?;
    let home = HomePage::new(ctx.base());
    ensure(home.is_user_logged_in().await, "user menu", "visible", "hidden")?;
    ensure(!home.is_login_link_visible().await, "login link", "hidden", "visible")?;
    if home.has_pagination().await {
        ctx.observe("more events available on further pages");
    }
    Ok(Verdict::Passed)
}
