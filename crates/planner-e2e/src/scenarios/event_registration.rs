//! Seat registration scenarios.

use crate::config::Role;
use crate::pages::{EventDetailsPage, HomePage, MyRegistrationsPage};
use crate::result::E2eResult;
use crate::scenario::{ensure, ScenarioContext, Verdict};

/// Open the listed event at `index` (the first one when fewer are listed).
/// `None` when the listing is empty.
async fn open_listed_event<'a>(
    ctx: &ScenarioContext<'a>,
    index: usize,
) -> E2eResult<Option<(String, EventDetailsPage<'a>)>> {
    ctx.open("/home").await?;
    let home = HomePage::new(ctx.base());
    let titles = home.event_titles().await?;
    let Some(title) = titles.get(index).or_else(|| titles.first()).cloned() else {
        return Ok(None);
    };

    home.click_event_by_title(title.trim()).await?;
    ctx.expect_location(&["/events/"]).await?;
    ctx.observe(format_args!("opened {title:?}"));
    Ok(Some((title, EventDetailsPage::new(ctx.base()))))
}

/// A signed-in user can take a seat
pub async fn register_for_event(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.login_as(Role::User).await?;
    let Some((_, details)) = open_listed_event(ctx, 0).await? else {
        return ctx.skip("no events listed");
    };

    if details.is_register_button_visible().await {
        details.click_register_button().await?;
        let success = details.success_message().await?;
        let registered = details.is_registered().await;
        ctx.observe(format_args!("success banner: {success:?}, registered: {registered}"));
        ensure(
            success.is_some() || registered,
            "registration confirmed",
            "success banner or unregister button",
            "neither",
        )?;
    } else if details.is_registered().await {
        ctx.observe("already registered for this event");
    } else {
        return ctx.skip("event offers no registration (full or closed)");
    }
    Ok(Verdict::Passed)
}

/// Guests are sent to the sign-in form when they try to register
pub async fn register_without_login(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    let Some((_, details)) = open_listed_event(ctx, 0).await? else {
        return ctx.skip("no events listed");
    };

    if details.is_login_to_register_visible().await {
        details.click_login_to_register().await?;
    } else if details.is_register_button_visible().await {
        details.click_register_button().await?;
    } else {
        return ctx.skip("event offers no registration control to guests");
    }
    ctx.expect_location(&["login"]).await?;
    Ok(Verdict::Passed)
}

/// A registered user can give the seat back
pub async fn unregister_from_event(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.login_as(Role::User).await?;
    let Some((_, details)) = open_listed_event(ctx, 0).await? else {
        return ctx.skip("no events listed");
    };

    if !details.is_registered().await {
        if !details.is_register_button_visible().await {
            return ctx.skip("event offers no registration (full or closed)");
        }
        ctx.observe("not registered yet, registering first");
        details.click_register_button().await?;
        ensure(
            details.is_registered().await,
            "registered before unregistering",
            "unregister button",
            "missing",
        )?;
    }

    details.click_unregister_button().await?;
    let success = details.success_message().await?;
    let reopened = details.is_register_button_visible().await;
    ctx.observe(format_args!("success banner: {success:?}, register button: {reopened}"));
    ensure(
        success.is_some() || reopened,
        "unregistration confirmed",
        "success banner or register button",
        "neither",
    )?;
    Ok(Verdict::Passed)
}

/// The registrations screen opens for a signed-in user
pub async fn view_my_registrations(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.login_as(Role::User).await?;
    ctx.open("/my-registrations").await?;
    ctx.expect_location(&["registrations"]).await?;

    let page = MyRegistrationsPage::new(ctx.base());
    ensure(
        page.is_my_registrations_page().await,
        "registrations heading",
        "My Registrations",
        "missing",
    )?;
    let titles = page.registered_titles().await?;
    ctx.observe(format_args!("{} registrations listed", titles.len()));
    Ok(Verdict::Passed)
}

/// A seat just taken shows up on the registrations screen
pub async fn registered_event_listed(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.login_as(Role::User).await?;
    // second listed event, away from the ones the other seat scenarios use
    let Some((title, details)) = open_listed_event(ctx, 1).await? else {
        return ctx.skip("no events listed");
    };

    if !details.is_registered().await {
        if !details.is_register_button_visible().await {
            return ctx.skip("event offers no registration (full or closed)");
        }
        details.click_register_button().await?;
    }

    ctx.open("/my-registrations").await?;
    let titles = MyRegistrationsPage::new(ctx.base())
        .registered_titles()
        .await?;
    ensure(
        titles.iter().any(|t| t.trim() == title.trim()),
        "event listed under my registrations",
        &title,
        format!("{titles:?}"),
    )?;
    Ok(Verdict::Passed)
}

/// Guests asking for their registrations are sent to the sign-in form
pub async fn my_registrations_requires_login(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.open("/my-registrations").await?;
    ctx.expect_location(&["login"]).await?;
    Ok(Verdict::Passed)
}
