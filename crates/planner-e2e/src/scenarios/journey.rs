//! End-to-end journey of a brand new user.

use crate::pages::{EventDetailsPage, HomePage, LoginPage, MyRegistrationsPage, RegisterPage};
use crate::result::E2eResult;
use crate::scenario::{ensure, ScenarioContext, Verdict};

const JOURNEY_NAME: &str = "Playwright Test User";
const JOURNEY_PASSWORD: &str = "PlaywrightTest123!";

/// Sign up, sign in, take a seat and find it under my registrations
pub async fn complete_user_journey(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    let email = ctx.unique_email();

    ctx.open("/register").await?;
    RegisterPage::new(ctx.base())
        .register(JOURNEY_NAME, &email, JOURNEY_PASSWORD, None)
        .await?;
    ctx.expect_location(&["login"]).await?;
    ctx.observe(format_args!("step 1: signed up as {email}"));

    LoginPage::new(ctx.base())
        .login(&email, JOURNEY_PASSWORD)
        .await?;
    ctx.expect_location(&["home", "events"]).await?;
    ctx.observe("step 2: signed in");

    ctx.open("/home").await?;
    let home = HomePage::new(ctx.base());
    if home.event_count().await? == 0 {
        return ctx.skip("no events listed");
    }
    home.click_first_event().await?;
    ctx.expect_location(&["/events/"]).await?;

    let details = EventDetailsPage::new(ctx.base());
    let title = details.title().await?;
    if !details.is_register_button_visible().await {
        return ctx.skip(format!("{title:?} offers no registration"));
    }
    details.click_register_button().await?;
    let success = details.success_message().await?;
    let registered = details.is_registered().await;
    ensure(
        success.is_some() || registered,
        "registration confirmed",
        "success banner or unregister button",
        "neither",
    )?;
    ctx.observe(format_args!("step 3: registered for {title:?}"));

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
    ctx.observe("step 4: registration listed");
    Ok(Verdict::Passed)
}
