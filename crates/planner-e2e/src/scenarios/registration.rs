//! Sign-up scenarios.

use crate::pages::{LoginPage, RegisterPage};
use crate::result::E2eResult;
use crate::scenario::{ensure, Rejection, ScenarioContext, Verdict};

/// Shortest password the application accepts
const MIN_LENGTH_PASSWORD: &str = "pass1234";

/// One character below the minimum
const SHORT_PASSWORD: &str = "pass123";

/// The sign-up form renders
pub async fn register_page_accessible(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.open("/register").await?;
    let page = RegisterPage::new(ctx.base());
    ensure(page.is_register_page().await, "sign-up form shown", "Sign Up heading", "missing")?;
    Ok(Verdict::Passed)
}

async fn expect_account_created(
    ctx: &ScenarioContext<'_>,
    email: &str,
    password: &str,
) -> E2eResult<Verdict> {
    let name = ctx.config().test_user.name.clone();
    ctx.open("/register").await?;
    RegisterPage::new(ctx.base())
        .register(&name, email, password, None)
        .await?;

    ctx.expect_location(&["login"]).await?;
    let success = LoginPage::new(ctx.base()).success_message().await?;
    ensure(
        success.is_some(),
        "success banner after sign-up",
        "banner",
        "none",
    )?;
    ctx.observe(format_args!("account {email} created"));
    Ok(Verdict::Passed)
}

async fn expect_sign_up_refused<'a>(
    ctx: &ScenarioContext<'a>,
    name: &str,
    email: &str,
    password: &str,
    confirmation: Option<&str>,
    rejection: Rejection,
) -> E2eResult<RegisterPage<'a>> {
    ctx.open("/register").await?;
    let page = RegisterPage::new(ctx.base());
    page.register(name, email, password, confirmation).await?;

    let banner = page.is_error_displayed().await;
    if let Some(message) = page.error_message().await? {
        ctx.observe(format_args!("error shown: {message}"));
    }
    let location = ctx.base().current_location().await?;
    rejection.check(&location, "register", banner)?;
    Ok(page)
}

/// A fresh e-mail and a valid password create an account
pub async fn valid_registration(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    let email = ctx.unique_email();
    let password = ctx.config().test_user.password.clone();
    expect_account_created(ctx, &email, &password).await
}

/// Registering the configured test account twice is refused the second time
pub async fn duplicate_email(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    let user = &ctx.config().test_user;

    // the account may already exist from an earlier run, so the first
    // attempt is allowed to go either way
    ctx.open("/register").await?;
    RegisterPage::new(ctx.base())
        .register(&user.name, &user.email, &user.password, None)
        .await?;
    let first = ctx.base().current_location().await?;
    ctx.observe(format_args!("first attempt ended on {first}"));

    expect_sign_up_refused(
        ctx,
        &user.name,
        &user.email,
        &user.password,
        None,
        Rejection::ServerSide,
    )
    .await?;
    Ok(Verdict::Passed)
}

/// A confirmation that differs from the password is refused
pub async fn password_mismatch(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    let email = ctx.unique_email();
    let name = ctx.config().test_user.name.clone();
    expect_sign_up_refused(
        ctx,
        &name,
        &email,
        "password123",
        Some("differentpassword"),
        Rejection::ServerSide,
    )
    .await?;
    Ok(Verdict::Passed)
}

/// A password one character short of the minimum is refused
pub async fn password_too_short(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    let email = ctx.unique_email();
    let name = ctx.config().test_user.name.clone();
    let page = expect_sign_up_refused(
        ctx,
        &name,
        &email,
        SHORT_PASSWORD,
        None,
        Rejection::ServerSide,
    )
    .await?;
    ensure(page.has_field_errors().await, "password field error", "shown", "none")?;
    Ok(Verdict::Passed)
}

/// A password of exactly the minimum length is accepted
pub async fn password_minimum_length(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    let email = ctx.unique_email();
    expect_account_created(ctx, &email, MIN_LENGTH_PASSWORD).await
}

/// An empty name never leaves the browser
pub async fn empty_name(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    let email = ctx.unique_email();
    expect_sign_up_refused(ctx, "", &email, "password123", None, Rejection::ClientSide).await?;
    Ok(Verdict::Passed)
}

/// The sign-up form links to the sign-in form
pub async fn register_to_login_navigation(ctx: &ScenarioContext<'_>) -> E2eResult<Verdict> {
    ctx.open("/register").await?;
    RegisterPage::new(ctx.base()).click_login_link().await?;
    ctx.expect_location(&["login"]).await?;
    ensure(
        LoginPage::new(ctx.base()).is_login_page().await,
        "login form shown",
        "Sign In heading",
        "missing",
    )?;
    Ok(Verdict::Passed)
}
