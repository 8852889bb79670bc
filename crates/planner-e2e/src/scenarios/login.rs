//! Sign-in scenarios.

use crate::config::Role;
use crate::pages::{HomePage, LoginPage};
use crate::result::E2eResult;
use crate::scenario::{ensure, Rejection, ScenarioContext, Verdict};

/// The sign-in form renders with its heading and brand
pub async fn login_page_accessible(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.open("/login").await?;
    let page = LoginPage::new(ctx.base());

    let title = ctx.base().current_title().await?;
    ctx.observe(format_args!("page title: {title}"));
    ensure(page.is_login_page().await, "login form shown", "Sign In heading", "missing")?;
    ensure(page.is_brand_visible().await, "brand shown", "visible", "hidden")?;
    Ok(Verdict::Passed)
}

async fn login_with(ctx: &ScenarioContext<'_>, role: Role, landing: &[&str]) -> E2eResult<Verdict> {
    let creds = ctx.config().credentials(role);
    ctx.open("/login").await?;
    LoginPage::new(ctx.base())
        .login(&creds.email, &creds.password)
        .await?;
    ctx.expect_location(landing).await?;
    Ok(Verdict::Passed)
}

/// Administrators land on the event administration screen
pub async fn valid_admin_login(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    login_with(ctx, Role::Admin, &["events"]).await
}

/// Standard users land on the listing
pub async fn valid_user_login(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    login_with(ctx, Role::User, &["home", "events"]).await
}

/// Managers land on the event administration screen
pub async fn valid_manager_login(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    login_with(ctx, Role::Manager, &["events"]).await
}

async fn expect_login_refused(
    ctx: &ScenarioContext<'_>,
    email: &str,
    password: &str,
    rejection: Rejection,
) -> E2eResult<Verdict> {
    ctx.open("/login").await?;
    let page = LoginPage::new(ctx.base());
    page.login(email, password).await?;

    let banner = page.is_error_displayed().await;
    if let Some(message) = page.error_message().await? {
        ctx.observe(format_args!("error shown: {message}"));
    }
    let location = ctx.base().current_location().await?;
    rejection.check(&location, "login", banner)?;
    Ok(Verdict::Passed)
}

/// A known e-mail with the wrong password is refused by the server
pub async fn wrong_password(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    let email = ctx.config().admin.email.clone();
    expect_login_refused(ctx, &email, "wrongpassword123", Rejection::ServerSide).await
}

/// An unknown e-mail is refused by the server
pub async fn unknown_email(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    expect_login_refused(ctx, "nonexistent@notreal.com", "anypassword", Rejection::ServerSide).await
}

/// A malformed e-mail never leaves the browser
pub async fn invalid_email_format(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    expect_login_refused(ctx, "notanemail", "password123", Rejection::ClientSide).await
}

/// Logging out ends the session: protected screens send the user back to
/// the sign-in form
pub async fn user_logout(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.login_as(Role::User).await?;
    let home = HomePage::new(ctx.base());
    ensure(home.is_user_logged_in().await, "user menu shown", "visible", "hidden")?;

    home.logout().await?;
    ctx.expect_location(&["login"]).await?;

    ctx.open("/my-registrations").await?;
    ctx.expect_location(&["login"]).await?;
    Ok(Verdict::Passed)
}
